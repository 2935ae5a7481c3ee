use std::sync::Arc;

use supportdesk_core::audit::AuditSink;
use supportdesk_core::config::{AppConfig, Paradigm};
use supportdesk_core::domain::context::ConversationContext;
use supportdesk_core::domain::query::{CustomerId, CustomerQuery};
use supportdesk_core::domain::response::SupportResponse;
use supportdesk_core::errors::DomainError;

use crate::runtime::{AgentRuntime, TurnOutcome};
use crate::session::{lock_context, SessionStore};

/// Entry point for callers: owns the agent and the session store for its
/// whole lifetime.
pub struct SupportService {
    runtime: AgentRuntime,
    sessions: SessionStore,
}

impl Default for SupportService {
    fn default() -> Self {
        Self::new(AgentRuntime::default())
    }
}

impl SupportService {
    pub fn new(runtime: AgentRuntime) -> Self {
        Self { runtime, sessions: SessionStore::new() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(AgentRuntime::from_config(config))
    }

    pub fn with_audit_sink(config: &AppConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            runtime: AgentRuntime::from_config(config).with_audit_sink(Arc::clone(&audit)),
            sessions: SessionStore::with_audit_sink(audit),
        }
    }

    pub fn handle_query(&self, query: CustomerQuery) -> Result<SupportResponse, DomainError> {
        self.handle_query_detailed(query).map(|outcome| outcome.response)
    }

    /// The fairness check runs before the store is consulted, so a rejected
    /// query never creates a context. The customer's lock is held for the
    /// whole turn.
    pub fn handle_query_detailed(&self, query: CustomerQuery) -> Result<TurnOutcome, DomainError> {
        self.runtime.check_fairness(&query)?;

        let shared = self.sessions.get_or_create(query.customer_id());
        let mut context = lock_context(&shared);
        self.runtime.run_turn(query, &mut context)
    }

    pub fn context(&self, customer_id: &CustomerId) -> Option<ConversationContext> {
        self.sessions.get(customer_id).map(|shared| lock_context(&shared).clone())
    }

    pub fn clear_context(&self, customer_id: &CustomerId) -> bool {
        self.sessions.clear(customer_id)
    }

    pub fn active_conversation_count(&self) -> usize {
        self.sessions.count()
    }

    pub fn paradigm(&self) -> Paradigm {
        self.runtime.paradigm()
    }

    pub fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
