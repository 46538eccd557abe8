//! Audit sinks for safety overrides and circuit trips.
//!
//! Events carry identifiers and classifications only. Raw user text never
//! reaches an audit sink.

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::security::crisis::CrisisType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;

const DEFAULT_MEMORY_CAPACITY: usize = 1_024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditEventType {
    SafetyOverride,
    CircuitTrip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub user_id: String,
    pub request_id: String,
    pub crisis_type: Option<CrisisType>,
    pub response_source: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn safety_override(
        user_id: &str,
        request_id: &str,
        crisis_type: CrisisType,
        response_source: &str,
    ) -> Self {
        Self {
            event_type: AuditEventType::SafetyOverride,
            user_id: user_id.to_string(),
            request_id: request_id.to_string(),
            crisis_type: Some(crisis_type),
            response_source: Some(response_source.to_string()),
            recorded_at: Utc::now(),
        }
    }

    pub fn circuit_trip(user_id: &str, request_id: &str) -> Self {
        Self {
            event_type: AuditEventType::CircuitTrip,
            user_id: user_id.to_string(),
            request_id: request_id.to_string(),
            crisis_type: None,
            response_source: None,
            recorded_at: Utc::now(),
        }
    }
}

/// Fire-and-forget audit sink. The gatekeeper spawns every `record` call and
/// never awaits it on the request path.
pub trait AuditLog: Send + Sync {
    fn record<'a>(
        &'a self,
        event: &'a AuditEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuditError>> + Send + 'a>>;

    fn name(&self) -> &str;

    /// Events the sink can still hand back, oldest first. Write-only sinks
    /// return nothing.
    fn recent(&self) -> Vec<AuditEvent> {
        Vec::new()
    }
}

/// Writes each event as a structured `tracing` line.
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn record<'a>(
        &'a self,
        event: &'a AuditEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuditError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(
                target: "audit",
                event_type = %event.event_type,
                user_id = %event.user_id,
                request_id = %event.request_id,
                crisis_type = ?event.crisis_type,
                response_source = ?event.response_source,
                recorded_at = %event.recorded_at.to_rfc3339(),
                "audit.record"
            );
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

pub struct NoopAuditLog;

impl AuditLog for NoopAuditLog {
    fn record<'a>(
        &'a self,
        _event: &'a AuditEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuditError>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Bounded in-memory ring; oldest events fall off first.
#[derive(Debug)]
pub struct MemoryAuditLog {
    events: Mutex<VecDeque<AuditEvent>>,
    capacity: usize,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn record<'a>(
        &'a self,
        event: &'a AuditEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuditError>> + Send + 'a>> {
        Box::pin(async move {
            let mut events = self
                .events
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if events.len() >= self.capacity {
                events.pop_front();
            }
            events.push_back(event.clone());
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn recent(&self) -> Vec<AuditEvent> {
        self.events()
    }
}

/// Appends one JSON object per line to a file, creating parent directories
/// on first write.
#[derive(Debug)]
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl AuditLog for JsonlAuditLog {
    fn record<'a>(
        &'a self,
        event: &'a AuditEvent,
    ) -> Pin<Box<dyn Future<Output = Result<(), AuditError>> + Send + 'a>> {
        Box::pin(async move {
            let mut line = serde_json::to_string(event)?;
            line.push('\n');
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

/// Factory: audit sink from config. `None` when auditing is disabled.
/// An unknown sink name falls back to tracing rather than dropping events.
pub fn create_audit_log(config: &AuditConfig) -> Option<Arc<dyn AuditLog>> {
    if !config.enabled {
        return None;
    }
    match config.sink.as_str() {
        "tracing" => Some(Arc::new(TracingAuditLog)),
        "memory" => Some(Arc::new(MemoryAuditLog::new())),
        "jsonl" => match &config.path {
            Some(path) => Some(Arc::new(JsonlAuditLog::new(path.clone()))),
            None => {
                tracing::warn!("Audit sink 'jsonl' has no path, falling back to tracing");
                Some(Arc::new(TracingAuditLog))
            }
        },
        "none" | "noop" => None,
        _ => {
            tracing::warn!(
                "Unknown audit sink '{}', falling back to tracing",
                config.sink
            );
            Some(Arc::new(TracingAuditLog))
        }
    }
}
