use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::query::{CustomerId, CustomerQuery};
use crate::domain::response::SupportResponse;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulated conversation state for one customer.
///
/// Both histories are append-only. The interaction count is the length of the
/// query history, so it cannot drift from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationContext {
    session_id: SessionId,
    customer_id: CustomerId,
    query_history: Vec<CustomerQuery>,
    response_history: Vec<SupportResponse>,
    context_data: BTreeMap<String, Value>,
}

impl ConversationContext {
    pub fn new(session_id: SessionId, customer_id: CustomerId) -> Self {
        Self {
            session_id,
            customer_id,
            query_history: Vec::new(),
            response_history: Vec::new(),
            context_data: BTreeMap::new(),
        }
    }

    pub fn add_query(&mut self, query: CustomerQuery) {
        self.query_history.push(query);
    }

    pub fn add_response(&mut self, response: SupportResponse) {
        self.response_history.push(response);
    }

    pub fn set_context_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context_data.insert(key.into(), value.into());
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context_data.get(key)
    }

    pub fn last_query(&self) -> Option<&CustomerQuery> {
        self.query_history.last()
    }

    pub fn last_response(&self) -> Option<&SupportResponse> {
        self.response_history.last()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn query_history(&self) -> &[CustomerQuery] {
        &self.query_history
    }

    pub fn response_history(&self) -> &[SupportResponse] {
        &self.response_history
    }

    pub fn context_data(&self) -> BTreeMap<String, Value> {
        self.context_data.clone()
    }

    pub fn interaction_count(&self) -> usize {
        self.query_history.len()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::query::{CustomerId, CustomerQuery, QueryId};
    use crate::domain::response::{ResponseId, SupportResponse};

    use super::{ConversationContext, SessionId};

    fn context() -> ConversationContext {
        ConversationContext::new(SessionId("S-1".to_string()), CustomerId("C-1".to_string()))
    }

    #[test]
    fn fresh_context_is_empty() {
        let context = context();
        assert_eq!(context.interaction_count(), 0);
        assert!(context.last_query().is_none());
        assert!(context.last_response().is_none());
        assert!(context.context_data().is_empty());
        assert_eq!(context.customer_id().as_str(), "C-1");
    }

    #[test]
    fn queries_are_kept_in_arrival_order_and_counted() {
        let mut context = context();
        context.add_query(CustomerQuery::new("Q-1", "C-1", "first"));
        context.add_query(CustomerQuery::new("Q-2", "C-1", "second"));

        assert_eq!(context.interaction_count(), 2);
        let ids: Vec<_> = context.query_history().iter().map(|q| q.id().0.as_str()).collect();
        assert_eq!(ids, vec!["Q-1", "Q-2"]);
        assert_eq!(context.last_query().map(|q| q.text()), Some("second"));
    }

    #[test]
    fn responses_do_not_move_the_interaction_count() {
        let mut context = context();
        context.add_response(SupportResponse::new(
            ResponseId("R-1".to_string()),
            QueryId("Q-1".to_string()),
            "hello",
        ));

        assert_eq!(context.interaction_count(), 0);
        assert_eq!(context.response_history().len(), 1);
        assert_eq!(context.last_response().map(|r| r.id().0.as_str()), Some("R-1"));
    }

    #[test]
    fn scratch_values_overwrite_by_key() {
        let mut context = context();
        context.set_context_value("lastIntent", "HELP_REQUEST");
        context.set_context_value("lastIntent", "REFUND_REQUEST");
        context.set_context_value("attempts", 3);

        assert_eq!(context.context_value("lastIntent"), Some(&json!("REFUND_REQUEST")));
        assert_eq!(context.context_value("attempts"), Some(&json!(3)));
        assert!(context.context_value("missing").is_none());
    }

    #[test]
    fn context_data_snapshot_is_detached_from_stored_state() {
        let mut context = context();
        context.set_context_value("lastSentiment", "NEUTRAL");

        let mut snapshot = context.context_data();
        snapshot.insert("lastSentiment".to_string(), json!("NEGATIVE"));
        snapshot.insert("extra".to_string(), json!(true));

        assert_eq!(context.context_value("lastSentiment"), Some(&json!("NEUTRAL")));
        assert!(context.context_value("extra").is_none());
    }

    #[test]
    fn cloned_context_does_not_share_history() {
        let mut context = context();
        context.add_query(CustomerQuery::new("Q-1", "C-1", "first"));

        let mut copy = context.clone();
        copy.add_query(CustomerQuery::new("Q-2", "C-1", "second"));

        assert_eq!(context.interaction_count(), 1);
        assert_eq!(copy.interaction_count(), 2);
    }
}
