use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Upper bound on one delegation. Unset leaves timeouts to the processor.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_max_user_id_len")]
    pub max_user_id_len: usize,
}

fn default_max_user_id_len() -> usize {
    256
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            max_user_id_len: default_max_user_id_len(),
        }
    }
}

impl ProcessingConfig {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "processing.timeout_secs must be at least 1 when set".into(),
            ));
        }
        if self.max_user_id_len == 0 {
            return Err(ConfigError::Validation(
                "processing.max_user_id_len must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
