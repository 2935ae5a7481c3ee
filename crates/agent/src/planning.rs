use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use serde::Serialize;
use supportdesk_core::domain::context::ConversationContext;
use supportdesk_core::domain::query::CustomerQuery;

use crate::perception::{Intent, PerceptionResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlannedAction {
    AcknowledgeQuery,
    SearchKnowledgeBase,
    ProvideStepByStepGuide,
    GatherSystemInfo,
    RunDiagnostics,
    SuggestSolutions,
    RetrieveBillingInfo,
    ExplainCharges,
    VerifyEligibility,
    EscalateToSpecialist,
    ProvideGeneralInfo,
    UpdateContext,
}

impl PlannedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AcknowledgeQuery => "ACKNOWLEDGE_QUERY",
            Self::SearchKnowledgeBase => "SEARCH_KNOWLEDGE_BASE",
            Self::ProvideStepByStepGuide => "PROVIDE_STEP_BY_STEP_GUIDE",
            Self::GatherSystemInfo => "GATHER_SYSTEM_INFO",
            Self::RunDiagnostics => "RUN_DIAGNOSTICS",
            Self::SuggestSolutions => "SUGGEST_SOLUTIONS",
            Self::RetrieveBillingInfo => "RETRIEVE_BILLING_INFO",
            Self::ExplainCharges => "EXPLAIN_CHARGES",
            Self::VerifyEligibility => "VERIFY_ELIGIBILITY",
            Self::EscalateToSpecialist => "ESCALATE_TO_SPECIALIST",
            Self::ProvideGeneralInfo => "PROVIDE_GENERAL_INFO",
            Self::UpdateContext => "UPDATE_CONTEXT",
        }
    }
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn intent_actions(intent: Intent) -> &'static [PlannedAction] {
    match intent {
        Intent::HelpRequest => {
            &[PlannedAction::SearchKnowledgeBase, PlannedAction::ProvideStepByStepGuide]
        }
        Intent::TechnicalIssue => &[
            PlannedAction::GatherSystemInfo,
            PlannedAction::RunDiagnostics,
            PlannedAction::SuggestSolutions,
        ],
        Intent::BillingInquiry => {
            &[PlannedAction::RetrieveBillingInfo, PlannedAction::ExplainCharges]
        }
        Intent::RefundRequest => {
            &[PlannedAction::VerifyEligibility, PlannedAction::EscalateToSpecialist]
        }
        Intent::GeneralInquiry => &[PlannedAction::ProvideGeneralInfo],
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: String,
    pub priority: i32,
    pub description: String,
}

#[derive(Debug)]
struct QueuedTask {
    sequence: u64,
    task: Task,
}

// Higher priority first; among equal priorities the earlier insertion wins.
impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.task
            .priority
            .cmp(&other.task.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedTask {}

/// Max-priority queue with FIFO ordering among equal priorities.
///
/// Not internally synchronized. Share it across threads behind its own lock,
/// never the lock guarding a conversation context.
#[derive(Debug, Default)]
pub struct TaskQueue {
    heap: BinaryHeap<QueuedTask>,
    next_sequence: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedTask { sequence, task });
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.heap.pop().map(|queued| queued.task)
    }

    pub fn peek(&self) -> Option<&Task> {
        self.heap.peek().map(|queued| &queued.task)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct PlanningEngine {
    tasks: TaskQueue,
}

impl PlanningEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered, informational action list for one turn. Does not touch the
    /// task queue.
    pub fn plan_actions(
        &self,
        _query: &CustomerQuery,
        perception: &PerceptionResult,
        _context: &ConversationContext,
    ) -> Vec<PlannedAction> {
        let mut actions = vec![PlannedAction::AcknowledgeQuery];
        actions.extend_from_slice(intent_actions(perception.intent));
        actions.push(PlannedAction::UpdateContext);
        actions
    }

    pub fn add_task(
        &mut self,
        id: impl Into<String>,
        priority: i32,
        description: impl Into<String>,
    ) {
        self.tasks.push(Task { id: id.into(), priority, description: description.into() });
    }

    pub fn next_task(&mut self) -> Option<Task> {
        self.tasks.pop()
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }
}
