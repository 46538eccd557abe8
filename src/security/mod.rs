pub mod audit;
pub mod crisis;

pub use audit::{
    AuditEvent, AuditEventType, AuditLog, JsonlAuditLog, MemoryAuditLog, NoopAuditLog,
    TracingAuditLog, create_audit_log,
};
pub use crisis::{CrisisAssessment, CrisisType, SafetyResponse};
