use std::fmt;

use serde::Serialize;
use supportdesk_core::config::PerceptionBackend;
use supportdesk_core::domain::query::CustomerQuery;

const URGENT_KEYWORDS: [&str; 5] = ["urgent", "emergency", "immediately", "critical", "asap"];
const NEGATIVE_KEYWORDS: [&str; 5] = ["unhappy", "frustrated", "angry", "disappointed", "terrible"];
const POSITIVE_KEYWORDS: [&str; 5] = ["thank", "happy", "great", "excellent", "appreciate"];
const STOP_WORDS: [&str; 8] = ["the", "and", "for", "with", "that", "this", "from", "have"];

const BASE_URGENCY: f64 = 0.3;
const URGENT_KEYWORD_WEIGHT: f64 = 0.2;
const EXCLAMATION_WEIGHT: f64 = 0.15;
const SHOUTING_WEIGHT: f64 = 0.15;
const MAX_KEYWORDS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    RefundRequest,
    HelpRequest,
    TechnicalIssue,
    BillingInquiry,
    GeneralInquiry,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RefundRequest => "REFUND_REQUEST",
            Self::HelpRequest => "HELP_REQUEST",
            Self::TechnicalIssue => "TECHNICAL_ISSUE",
            Self::BillingInquiry => "BILLING_INQUIRY",
            Self::GeneralInquiry => "GENERAL_INQUIRY",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "NEGATIVE",
            Self::Neutral => "NEUTRAL",
            Self::Positive => "POSITIVE",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerceptionResult {
    pub intent: Intent,
    pub sentiment: Sentiment,
    pub urgency: f64,
    pub keywords: Vec<String>,
}

/// Turns raw query text into the shape reasoning and planning consume.
///
/// Implementations must be deterministic for a given query; the agent may call
/// `analyze` from many threads at once.
pub trait PerceptionMechanism: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyze(&self, query: &CustomerQuery) -> PerceptionResult;
}

pub fn perception_for(backend: PerceptionBackend) -> Box<dyn PerceptionMechanism> {
    match backend {
        PerceptionBackend::RuleBased => Box::new(RuleBasedPerception::new()),
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuleBasedPerception;

impl RuleBasedPerception {
    pub fn new() -> Self {
        Self
    }
}

impl PerceptionMechanism for RuleBasedPerception {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    fn analyze(&self, query: &CustomerQuery) -> PerceptionResult {
        let normalized_text = normalize_text(query.text());

        PerceptionResult {
            intent: detect_intent(&normalized_text),
            sentiment: detect_sentiment(&normalized_text),
            urgency: urgency_score(query.text(), &normalized_text),
            keywords: extract_keywords(&normalized_text),
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

fn contains_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|pattern| text.contains(pattern))
}

fn count_hits(text: &str, patterns: &[&str]) -> usize {
    patterns.iter().filter(|pattern| text.contains(**pattern)).count()
}

// First match wins; the order below is the precedence.
fn detect_intent(normalized_text: &str) -> Intent {
    if contains_any(normalized_text, &["refund", "money back"]) {
        Intent::RefundRequest
    } else if contains_any(normalized_text, &["how to", "help with"]) {
        Intent::HelpRequest
    } else if contains_any(normalized_text, &["not working", "broken"]) {
        Intent::TechnicalIssue
    } else if contains_any(normalized_text, &["billing", "charge"]) {
        Intent::BillingInquiry
    } else {
        Intent::GeneralInquiry
    }
}

fn detect_sentiment(normalized_text: &str) -> Sentiment {
    let negative = count_hits(normalized_text, &NEGATIVE_KEYWORDS);
    let positive = count_hits(normalized_text, &POSITIVE_KEYWORDS);

    match negative.cmp(&positive) {
        std::cmp::Ordering::Greater => Sentiment::Negative,
        std::cmp::Ordering::Less => Sentiment::Positive,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

fn urgency_score(raw_text: &str, normalized_text: &str) -> f64 {
    let urgent_hits = count_hits(normalized_text, &URGENT_KEYWORDS);

    let mut urgency = BASE_URGENCY + urgent_hits as f64 * URGENT_KEYWORD_WEIGHT;
    if normalized_text.contains('!') {
        urgency += EXCLAMATION_WEIGHT;
    }
    if has_uppercase_run(raw_text, 3) {
        urgency += SHOUTING_WEIGHT;
    }
    urgency.min(1.0)
}

// Casing is lost after normalization, so this looks at the text as written.
fn has_uppercase_run(text: &str, min_run: usize) -> bool {
    let mut run = 0usize;
    for character in text.chars() {
        if character.is_ascii_uppercase() {
            run += 1;
            if run >= min_run {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

fn extract_keywords(normalized_text: &str) -> Vec<String> {
    normalized_text
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .filter(|word| !STOP_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}
