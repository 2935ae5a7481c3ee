use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use supportdesk_core::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, NoopAuditSink};
use supportdesk_core::domain::context::{ConversationContext, SessionId};
use supportdesk_core::domain::query::CustomerId;
use tracing::info;

/// A customer's context behind its own lock. Holding the guard serialises
/// turns for that customer only.
pub type SharedContext = Arc<Mutex<ConversationContext>>;

const AUDIT_ACTOR: &str = "session-store";

/// Concurrent map from customer id to conversation context.
///
/// Contexts are created lazily and live until `clear` is called; nothing is
/// evicted in the background.
pub struct SessionStore {
    contexts: DashMap<CustomerId, SharedContext>,
    audit: Arc<dyn AuditSink>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_audit_sink(Arc::new(NoopAuditSink))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audit_sink(audit: Arc<dyn AuditSink>) -> Self {
        Self { contexts: DashMap::new(), audit }
    }

    /// Atomic per key: concurrent first touches for the same customer all
    /// receive the one context that gets created.
    pub fn get_or_create(&self, customer_id: &CustomerId) -> SharedContext {
        let entry = self.contexts.entry(customer_id.clone()).or_insert_with(|| {
            let session_id = SessionId::generate();
            info!(
                event_name = "session.context.created",
                customer_id = %customer_id,
                session_id = %session_id,
                "conversation context created"
            );
            self.audit.emit(
                AuditEvent::new(
                    Some(customer_id.clone()),
                    None,
                    "session.context.created",
                    AuditCategory::Session,
                    AUDIT_ACTOR,
                    AuditOutcome::Success,
                )
                .with_metadata("session_id", session_id.to_string()),
            );
            Arc::new(Mutex::new(ConversationContext::new(session_id, customer_id.clone())))
        });
        Arc::clone(entry.value())
    }

    pub fn get(&self, customer_id: &CustomerId) -> Option<SharedContext> {
        self.contexts.get(customer_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn clear(&self, customer_id: &CustomerId) -> bool {
        let removed = self.contexts.remove(customer_id).is_some();
        if removed {
            info!(
                event_name = "session.context.cleared",
                customer_id = %customer_id,
                "conversation context cleared"
            );
            self.audit.emit(AuditEvent::new(
                Some(customer_id.clone()),
                None,
                "session.context.cleared",
                AuditCategory::Session,
                AUDIT_ACTOR,
                AuditOutcome::Success,
            ));
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

pub fn lock_context(context: &SharedContext) -> MutexGuard<'_, ConversationContext> {
    match context.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
