use std::fmt;

use serde::Serialize;
use supportdesk_core::domain::context::ConversationContext;
use supportdesk_core::domain::query::CustomerQuery;

use crate::perception::{Intent, PerceptionResult, Sentiment};

pub const ESCALATION_URGENCY_THRESHOLD: f64 = 0.7;
pub const NEGATIVE_HISTORY_THRESHOLD: usize = 2;

const BASE_CONFIDENCE: f64 = 0.8;
const HIGH_URGENCY_PENALTY: f64 = 0.2;
const NEGATIVE_SENTIMENT_PENALTY: f64 = 0.15;
const GENERAL_INQUIRY_BONUS: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStrategy {
    ProvideGuidance,
    ExplainBilling,
    Troubleshoot,
    EscalateToHuman,
    GeneralAssistance,
}

impl ResponseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProvideGuidance => "PROVIDE_GUIDANCE",
            Self::ExplainBilling => "EXPLAIN_BILLING",
            Self::Troubleshoot => "TROUBLESHOOT",
            Self::EscalateToHuman => "ESCALATE_TO_HUMAN",
            Self::GeneralAssistance => "GENERAL_ASSISTANCE",
        }
    }
}

impl fmt::Display for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReasoningEngine;

impl ReasoningEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rules are checked in order and the first hit decides.
    pub fn should_escalate(
        &self,
        _query: &CustomerQuery,
        perception: &PerceptionResult,
        context: &ConversationContext,
    ) -> bool {
        if perception.urgency >= ESCALATION_URGENCY_THRESHOLD {
            return true;
        }

        if perception.sentiment == Sentiment::Negative
            && context.interaction_count() > NEGATIVE_HISTORY_THRESHOLD
        {
            return true;
        }

        matches!(perception.intent, Intent::RefundRequest | Intent::TechnicalIssue)
    }

    pub fn determine_response_strategy(&self, intent: Intent) -> ResponseStrategy {
        match intent {
            Intent::HelpRequest => ResponseStrategy::ProvideGuidance,
            Intent::BillingInquiry => ResponseStrategy::ExplainBilling,
            Intent::TechnicalIssue => ResponseStrategy::Troubleshoot,
            Intent::RefundRequest => ResponseStrategy::EscalateToHuman,
            Intent::GeneralInquiry => ResponseStrategy::GeneralAssistance,
        }
    }

    pub fn calculate_confidence(
        &self,
        _strategy: ResponseStrategy,
        perception: &PerceptionResult,
    ) -> f64 {
        let mut confidence = BASE_CONFIDENCE;
        if perception.urgency > ESCALATION_URGENCY_THRESHOLD {
            confidence -= HIGH_URGENCY_PENALTY;
        }
        if perception.sentiment == Sentiment::Negative {
            confidence -= NEGATIVE_SENTIMENT_PENALTY;
        }
        if perception.intent == Intent::GeneralInquiry {
            confidence += GENERAL_INQUIRY_BONUS;
        }
        confidence.clamp(0.0, 1.0)
    }
}
