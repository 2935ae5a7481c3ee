use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::query::QueryId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub String);

impl ResponseId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SupportResponse {
    id: ResponseId,
    query_id: QueryId,
    text: String,
    confidence: f64,
    requires_escalation: bool,
    escalation_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl SupportResponse {
    pub fn new(id: ResponseId, query_id: QueryId, text: impl Into<String>) -> Self {
        Self {
            id,
            query_id,
            text: text.into(),
            confidence: 1.0,
            requires_escalation: false,
            escalation_reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &ResponseId {
        &self.id
    }

    pub fn query_id(&self) -> &QueryId {
        &self.query_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn requires_escalation(&self) -> bool {
        self.requires_escalation
    }

    pub fn escalation_reason(&self) -> Option<&str> {
        self.escalation_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Rejects anything outside `[0.0, 1.0]`, NaN included, without touching
    /// the stored value.
    pub fn set_confidence(&mut self, confidence: f64) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DomainError::ConfidenceOutOfRange { value: confidence });
        }
        self.confidence = confidence;
        Ok(())
    }

    pub fn set_escalation(&mut self, requires_escalation: bool, reason: Option<String>) {
        self.requires_escalation = requires_escalation;
        self.escalation_reason = reason;
    }

    pub fn set_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
    }
}

impl PartialEq for SupportResponse {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
