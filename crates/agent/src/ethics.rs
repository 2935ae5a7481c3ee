use serde::Serialize;
use supportdesk_core::config::{normalize_terms, EthicsConfig};
use supportdesk_core::domain::query::CustomerQuery;
use supportdesk_core::domain::response::SupportResponse;

const BIASED_TERMS: [&str; 6] = ["always", "never", "all", "none", "must", "should"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EthicsIssue {
    BiasedLanguage,
    DiscriminatoryContent,
    LacksTransparency,
    UnexplainedEscalation,
}

impl EthicsIssue {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::BiasedLanguage => "biased_language",
            Self::DiscriminatoryContent => "discriminatory_content",
            Self::LacksTransparency => "lacks_transparency",
            Self::UnexplainedEscalation => "unexplained_escalation",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::BiasedLanguage => "Response contains potentially biased language",
            Self::DiscriminatoryContent => "Response may contain discriminatory content",
            Self::LacksTransparency => "Response lacks transparency about AI involvement",
            Self::UnexplainedEscalation => "Escalation lacks clear reasoning",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<EthicsIssue>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<EthicsIssue>) -> Self {
        Self { valid: issues.is_empty(), issues }
    }

    pub fn reason_codes(&self) -> Vec<&'static str> {
        self.issues.iter().map(EthicsIssue::reason_code).collect()
    }
}

/// Advisory checks on generated responses plus the fairness precondition on
/// incoming queries.
///
/// `validate` never blocks delivery; its findings are for logging and audit.
#[derive(Clone, Debug, PartialEq)]
pub struct EthicsValidator {
    biased_term_threshold: usize,
    transparency_floor: f64,
    discriminatory_terms: Vec<String>,
}

impl Default for EthicsValidator {
    fn default() -> Self {
        Self::from_config(&EthicsConfig::default())
    }
}

impl EthicsValidator {
    pub fn from_config(config: &EthicsConfig) -> Self {
        Self {
            biased_term_threshold: config.biased_term_threshold,
            transparency_floor: config.transparency_floor,
            discriminatory_terms: normalize_terms(config.discriminatory_terms.clone()),
        }
    }

    pub fn ensure_fairness(&self, query: &CustomerQuery) -> bool {
        !query.customer_id().is_empty()
    }

    // Every check runs; none short-circuits the others.
    pub fn validate(&self, response: &SupportResponse, _query: &CustomerQuery) -> ValidationResult {
        let normalized_text = response.text().to_lowercase();
        let mut issues = Vec::new();

        if self.contains_biased_language(&normalized_text) {
            issues.push(EthicsIssue::BiasedLanguage);
        }
        if self.contains_discriminatory_content(&normalized_text) {
            issues.push(EthicsIssue::DiscriminatoryContent);
        }
        if response.confidence() <= self.transparency_floor {
            issues.push(EthicsIssue::LacksTransparency);
        }
        if response.requires_escalation() && response.escalation_reason().is_none() {
            issues.push(EthicsIssue::UnexplainedEscalation);
        }

        ValidationResult::from_issues(issues)
    }

    fn contains_biased_language(&self, normalized_text: &str) -> bool {
        let hits = BIASED_TERMS.iter().filter(|term| normalized_text.contains(**term)).count();
        hits > self.biased_term_threshold
    }

    fn contains_discriminatory_content(&self, normalized_text: &str) -> bool {
        self.discriminatory_terms.iter().any(|term| normalized_text.contains(term.as_str()))
    }
}
