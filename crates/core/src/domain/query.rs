use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryCategory {
    #[default]
    General,
    Technical,
    Billing,
    Account,
    Product,
}

/// A single inbound customer message.
///
/// The identifier, customer and text are fixed at construction; callers may
/// re-classify priority and category or adjust the timestamp afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerQuery {
    id: QueryId,
    customer_id: CustomerId,
    text: String,
    created_at: DateTime<Utc>,
    priority: QueryPriority,
    category: QueryCategory,
}

impl CustomerQuery {
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: QueryId(id.into()),
            customer_id: CustomerId(customer_id.into()),
            text: text.into(),
            created_at: Utc::now(),
            priority: QueryPriority::default(),
            category: QueryCategory::default(),
        }
    }

    pub fn id(&self) -> &QueryId {
        &self.id
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn priority(&self) -> QueryPriority {
        self.priority
    }

    pub fn category(&self) -> QueryCategory {
        self.category
    }

    pub fn set_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
    }

    pub fn set_priority(&mut self, priority: QueryPriority) {
        self.priority = priority;
    }

    pub fn set_category(&mut self, category: QueryCategory) {
        self.category = category;
    }

    pub fn with_priority(mut self, priority: QueryPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: QueryCategory) -> Self {
        self.category = category;
        self
    }
}

impl PartialEq for CustomerQuery {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CustomerQuery {}
