use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Also audit closed -> open transitions, not just safety overrides.
    #[serde(default = "default_true")]
    pub record_circuit_trips: bool,
    /// "tracing" | "memory" | "jsonl" | "none"
    #[serde(default = "default_sink")]
    pub sink: String,
    /// Append-only file for the `jsonl` sink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_sink() -> String {
    "tracing".into()
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            record_circuit_trips: true,
            sink: default_sink(),
            path: None,
        }
    }
}

impl AuditConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.sink == "jsonl" && self.path.is_none() {
            return Err(ConfigError::Validation(
                "audit.path is required when audit.sink = \"jsonl\"".into(),
            ));
        }
        Ok(())
    }
}
