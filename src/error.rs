use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the gatekeeper.
///
/// Crisis routing and anchor mode are never errors and never show up here.
/// Library callers only ever see `Contract` from `Gatekeeper::handle`; the
/// other variants surface from construction, config loading and the
/// collaborator seams.
#[derive(Debug, Error)]
pub enum GatekeeperError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Caller contract ─────────────────────────────────────────────────
    #[error("contract: {0}")]
    Contract(#[from] ContractError),

    // ── Normal-processing collaborator ──────────────────────────────────
    #[error("processor: {0}")]
    Processor(#[from] ProcessorError),

    // ── Audit sink ──────────────────────────────────────────────────────
    #[error("audit: {0}")]
    Audit(#[from] AuditError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

// ─── Contract violations ─────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("user id exceeds {max} characters")]
    UserIdTooLong { max: usize },
}

// ─── Collaborator errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("processing failed: {0}")]
    Failed(String),

    #[error("processing timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("processing panicked")]
    Panicked,
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, GatekeeperError>;
