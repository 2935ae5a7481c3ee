//! Customer-support decision pipeline.
//!
//! Each query runs through a fixed, sequential set of stages:
//! 1. **Fairness precondition** (`ethics`) - reject queries without a customer id
//! 2. **Perception** (`perception`) - intent, sentiment, urgency and keywords
//! 3. **Reasoning** (`reasoning`) - escalation decision, strategy and confidence
//! 4. **Planning** (`planning`) - informational action list for the turn
//! 5. **Response synthesis** (`runtime`) - canned text per strategy
//! 6. **Advisory validation** (`ethics`) - findings are logged, never enforced
//! 7. **Context update** - history and scratch keys are written last
//!
//! `SupportService` ties the pipeline to a `SessionStore` holding one
//! conversation context per customer. Different customers run in parallel;
//! turns for the same customer are serialised by that context's lock.

pub mod ethics;
pub mod perception;
pub mod planning;
pub mod reasoning;
pub mod runtime;
pub mod service;
pub mod session;

pub use ethics::{EthicsIssue, EthicsValidator, ValidationResult};
pub use perception::{Intent, PerceptionMechanism, PerceptionResult, RuleBasedPerception, Sentiment};
pub use planning::{PlannedAction, PlanningEngine, Task, TaskQueue};
pub use reasoning::{ReasoningEngine, ResponseStrategy};
pub use runtime::{AgentRuntime, TurnOutcome};
pub use service::SupportService;
pub use session::{SessionStore, SharedContext};
