use std::sync::Arc;

use serde::Serialize;
use supportdesk_core::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, NoopAuditSink};
use supportdesk_core::config::{AppConfig, Paradigm};
use supportdesk_core::domain::context::ConversationContext;
use supportdesk_core::domain::query::CustomerQuery;
use supportdesk_core::domain::response::{ResponseId, SupportResponse};
use supportdesk_core::errors::DomainError;
use tracing::{debug, info, warn};

use crate::ethics::{EthicsValidator, ValidationResult};
use crate::perception::{perception_for, PerceptionMechanism, PerceptionResult, RuleBasedPerception};
use crate::planning::{PlannedAction, PlanningEngine};
use crate::reasoning::{ReasoningEngine, ResponseStrategy};

pub const LAST_INTENT_KEY: &str = "lastIntent";
pub const LAST_SENTIMENT_KEY: &str = "lastSentiment";

const AUDIT_ACTOR: &str = "support-agent";

/// Everything one turn produced. The planned actions are informational and do
/// not feed the response text.
#[derive(Clone, Debug, Serialize)]
pub struct TurnOutcome {
    pub response: SupportResponse,
    pub perception: PerceptionResult,
    pub strategy: ResponseStrategy,
    pub actions: Vec<PlannedAction>,
    pub validation: ValidationResult,
}

pub struct AgentRuntime {
    paradigm: Paradigm,
    perception: Box<dyn PerceptionMechanism>,
    reasoning: ReasoningEngine,
    planning: PlanningEngine,
    ethics: EthicsValidator,
    audit: Arc<dyn AuditSink>,
}

impl Default for AgentRuntime {
    fn default() -> Self {
        Self::new(Paradigm::Hybrid)
    }
}

impl AgentRuntime {
    pub fn new(paradigm: Paradigm) -> Self {
        Self {
            paradigm,
            perception: Box::new(RuleBasedPerception::new()),
            reasoning: ReasoningEngine::new(),
            planning: PlanningEngine::new(),
            ethics: EthicsValidator::default(),
            audit: Arc::new(NoopAuditSink),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            paradigm: config.agent.paradigm,
            perception: perception_for(config.agent.perception),
            reasoning: ReasoningEngine::new(),
            planning: PlanningEngine::new(),
            ethics: EthicsValidator::from_config(&config.ethics),
            audit: Arc::new(NoopAuditSink),
        }
    }

    pub fn with_perception(mut self, perception: Box<dyn PerceptionMechanism>) -> Self {
        self.perception = perception;
        self
    }

    pub fn with_ethics(mut self, ethics: EthicsValidator) -> Self {
        self.ethics = ethics;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn paradigm(&self) -> Paradigm {
        self.paradigm
    }

    pub fn perception(&self) -> &dyn PerceptionMechanism {
        self.perception.as_ref()
    }

    pub fn reasoning(&self) -> &ReasoningEngine {
        &self.reasoning
    }

    /// Read-only: the runtime only calls `plan_actions`. Callers that queue
    /// tasks own their own `PlanningEngine` or `TaskQueue` and its locking.
    pub fn planning(&self) -> &PlanningEngine {
        &self.planning
    }

    pub fn ethics(&self) -> &EthicsValidator {
        &self.ethics
    }

    pub fn check_fairness(&self, query: &CustomerQuery) -> Result<(), DomainError> {
        if self.ethics.ensure_fairness(query) {
            return Ok(());
        }

        warn!(
            event_name = "agent.fairness.rejected",
            query_id = %query.id(),
            "query rejected before processing: customer id is missing"
        );
        self.audit.emit(AuditEvent::new(
            None,
            Some(query.id().clone()),
            "agent.fairness.rejected",
            AuditCategory::Fairness,
            AUDIT_ACTOR,
            AuditOutcome::Rejected,
        ));
        Err(DomainError::FairnessViolation { query_id: query.id().clone() })
    }

    pub fn process_query(
        &self,
        query: CustomerQuery,
        context: &mut ConversationContext,
    ) -> Result<SupportResponse, DomainError> {
        self.run_turn(query, context).map(|outcome| outcome.response)
    }

    /// Runs the full pipeline for one query and records the turn in `context`.
    ///
    /// On a fairness failure nothing is written to the context. Ethics findings
    /// are logged and audited but never change the returned response.
    pub fn run_turn(
        &self,
        query: CustomerQuery,
        context: &mut ConversationContext,
    ) -> Result<TurnOutcome, DomainError> {
        self.check_fairness(&query)?;

        let perception = self.perception.analyze(&query);

        // All decisions read the context as it was before this turn.
        let escalate = self.reasoning.should_escalate(&query, &perception, context);
        let strategy = self.reasoning.determine_response_strategy(perception.intent);
        let confidence = self.reasoning.calculate_confidence(strategy, &perception);

        let actions = self.planning.plan_actions(&query, &perception, context);
        debug!(
            event_name = "agent.turn.planned",
            customer_id = %query.customer_id(),
            query_id = %query.id(),
            actions = ?actions,
            "planned actions"
        );

        let text = response_text(strategy);
        let mut response = SupportResponse::new(ResponseId::generate(), query.id().clone(), text);
        response.set_confidence(confidence)?;
        let escalation_reason = escalate.then(|| escalation_reason(&perception));
        response.set_escalation(escalate, escalation_reason);

        let validation = self.ethics.validate(&response, &query);
        if !validation.valid {
            self.report_ethics_issues(&query, &response, &validation);
        }

        info!(
            event_name = "agent.turn.completed",
            customer_id = %query.customer_id(),
            query_id = %query.id(),
            response_id = %response.id(),
            intent = %perception.intent,
            sentiment = %perception.sentiment,
            strategy = %strategy,
            confidence = response.confidence(),
            escalated = response.requires_escalation(),
            "query processed"
        );
        self.audit.emit(
            AuditEvent::new(
                Some(query.customer_id().clone()),
                Some(query.id().clone()),
                "agent.turn.completed",
                AuditCategory::Turn,
                AUDIT_ACTOR,
                AuditOutcome::Success,
            )
            .with_metadata("strategy", strategy.as_str())
            .with_metadata("escalated", response.requires_escalation().to_string()),
        );

        context.add_query(query);
        context.add_response(response.clone());
        context.set_context_value(LAST_INTENT_KEY, perception.intent.as_str());
        context.set_context_value(LAST_SENTIMENT_KEY, perception.sentiment.as_str());

        Ok(TurnOutcome { response, perception, strategy, actions, validation })
    }

    fn report_ethics_issues(
        &self,
        query: &CustomerQuery,
        response: &SupportResponse,
        validation: &ValidationResult,
    ) {
        let reason_codes = validation.reason_codes().join(",");
        warn!(
            event_name = "agent.ethics.flagged",
            customer_id = %query.customer_id(),
            query_id = %query.id(),
            response_id = %response.id(),
            issues = %reason_codes,
            "ethics validation raised issues; response delivered unchanged"
        );
        self.audit.emit(
            AuditEvent::new(
                Some(query.customer_id().clone()),
                Some(query.id().clone()),
                "agent.ethics.flagged",
                AuditCategory::Ethics,
                AUDIT_ACTOR,
                AuditOutcome::Flagged,
            )
            .with_metadata("issue_count", validation.issues.len().to_string())
            .with_metadata("issues", reason_codes),
        );
    }
}

fn response_text(strategy: ResponseStrategy) -> &'static str {
    match strategy {
        ResponseStrategy::ProvideGuidance => {
            "I'd be happy to help you with that. Let me provide you with step-by-step guidance."
        }
        ResponseStrategy::ExplainBilling => {
            "I understand you have a billing inquiry. Let me explain the charges on your account."
        }
        ResponseStrategy::Troubleshoot => {
            "I see you're experiencing a technical issue. Let's work together to resolve this."
        }
        ResponseStrategy::EscalateToHuman => {
            "I understand your concern. Let me connect you with a specialist who can better assist you."
        }
        ResponseStrategy::GeneralAssistance => {
            "Thank you for contacting support. I'm here to help you with your inquiry."
        }
    }
}

fn escalation_reason(perception: &PerceptionResult) -> String {
    format!("Urgency: {:.2}, Intent: {}", perception.urgency, perception.intent)
}
