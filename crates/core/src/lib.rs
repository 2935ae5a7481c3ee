pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;

pub use audit::{
    AuditCategory, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink, NoopAuditSink,
};
pub use config::{AppConfig, LoadOptions, Paradigm, PerceptionBackend};
pub use domain::context::{ConversationContext, SessionId};
pub use domain::query::{CustomerId, CustomerQuery, QueryCategory, QueryId, QueryPriority};
pub use domain::response::{ResponseId, SupportResponse};
pub use errors::{ApplicationError, DomainError, InterfaceError};
