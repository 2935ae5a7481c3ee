use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BIASED_TERM_THRESHOLD: usize = 2;
pub const DEFAULT_TRANSPARENCY_FLOOR: f64 = 0.30;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub ethics: EthicsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentConfig {
    pub paradigm: Paradigm,
    pub perception: PerceptionBackend,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EthicsConfig {
    pub biased_term_threshold: usize,
    pub transparency_floor: f64,
    pub discriminatory_terms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paradigm {
    RuleBased,
    LearningBased,
    Hybrid,
}

impl Paradigm {
    pub fn description(&self) -> &'static str {
        match self {
            Self::RuleBased => "Uses predefined rules and patterns",
            Self::LearningBased => "Uses machine learning for adaptive responses",
            Self::Hybrid => "Combines rule-based and learning-based approaches",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptionBackend {
    RuleBased,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub paradigm: Option<Paradigm>,
    pub perception: Option<PerceptionBackend>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub discriminatory_terms: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig {
                paradigm: Paradigm::Hybrid,
                perception: PerceptionBackend::RuleBased,
            },
            ethics: EthicsConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for EthicsConfig {
    fn default() -> Self {
        Self {
            biased_term_threshold: DEFAULT_BIASED_TERM_THRESHOLD,
            transparency_floor: DEFAULT_TRANSPARENCY_FLOOR,
            discriminatory_terms: Vec::new(),
        }
    }
}

impl std::str::FromStr for Paradigm {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rule_based" => Ok(Self::RuleBased),
            "learning_based" => Ok(Self::LearningBased),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ConfigError::Validation(format!(
                "unsupported agent paradigm `{other}` (expected rule_based|learning_based|hybrid)"
            ))),
        }
    }
}

impl std::str::FromStr for PerceptionBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rule_based" => Ok(Self::RuleBased),
            other => Err(ConfigError::Validation(format!(
                "unsupported perception backend `{other}` (expected rule_based)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("supportdesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(agent) = patch.agent {
            if let Some(paradigm) = agent.paradigm {
                self.agent.paradigm = paradigm;
            }
            if let Some(perception) = agent.perception {
                self.agent.perception = perception;
            }
        }

        if let Some(ethics) = patch.ethics {
            if let Some(threshold) = ethics.biased_term_threshold {
                self.ethics.biased_term_threshold = threshold;
            }
            if let Some(floor) = ethics.transparency_floor {
                self.ethics.transparency_floor = floor;
            }
            if let Some(terms) = ethics.discriminatory_terms {
                self.ethics.discriminatory_terms = normalize_terms(terms);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SUPPORTDESK_AGENT_PARADIGM") {
            self.agent.paradigm = value.parse()?;
        }
        if let Some(value) = read_env("SUPPORTDESK_AGENT_PERCEPTION") {
            self.agent.perception = value.parse()?;
        }

        if let Some(value) = read_env("SUPPORTDESK_ETHICS_BIASED_TERM_THRESHOLD") {
            self.ethics.biased_term_threshold =
                parse_usize("SUPPORTDESK_ETHICS_BIASED_TERM_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("SUPPORTDESK_ETHICS_TRANSPARENCY_FLOOR") {
            self.ethics.transparency_floor =
                parse_f64("SUPPORTDESK_ETHICS_TRANSPARENCY_FLOOR", &value)?;
        }
        if let Some(value) = read_env("SUPPORTDESK_ETHICS_DISCRIMINATORY_TERMS") {
            self.ethics.discriminatory_terms =
                normalize_terms(value.split(',').map(str::to_string).collect());
        }

        let log_level =
            read_env("SUPPORTDESK_LOGGING_LEVEL").or_else(|| read_env("SUPPORTDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SUPPORTDESK_LOGGING_FORMAT").or_else(|| read_env("SUPPORTDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(paradigm) = overrides.paradigm {
            self.agent.paradigm = paradigm;
        }
        if let Some(perception) = overrides.perception {
            self.agent.perception = perception;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(terms) = overrides.discriminatory_terms {
            self.ethics.discriminatory_terms = normalize_terms(terms);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ethics(&self.ethics)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("supportdesk.toml"), PathBuf::from("config/supportdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

// Terms are matched against lower-cased text, so store them lower-cased.
/// Lower-cases and trims denylist terms, dropping blanks.
pub fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}

fn validate_ethics(ethics: &EthicsConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&ethics.transparency_floor) {
        return Err(ConfigError::Validation(
            "ethics.transparency_floor must be in range 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    agent: Option<AgentPatch>,
    ethics: Option<EthicsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    paradigm: Option<Paradigm>,
    perception: Option<PerceptionBackend>,
}

#[derive(Debug, Default, Deserialize)]
struct EthicsPatch {
    biased_term_threshold: Option<usize>,
    transparency_floor: Option<f64>,
    discriminatory_terms: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{
        AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, Paradigm,
        PerceptionBackend,
    };

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ALL_VARS: &[&str] = &[
        "SUPPORTDESK_AGENT_PARADIGM",
        "SUPPORTDESK_AGENT_PERCEPTION",
        "SUPPORTDESK_ETHICS_BIASED_TERM_THRESHOLD",
        "SUPPORTDESK_ETHICS_TRANSPARENCY_FLOOR",
        "SUPPORTDESK_ETHICS_DISCRIMINATORY_TERMS",
        "SUPPORTDESK_LOGGING_LEVEL",
        "SUPPORTDESK_LOG_LEVEL",
        "SUPPORTDESK_LOGGING_FORMAT",
        "SUPPORTDESK_LOG_FORMAT",
        "TEST_SUPPORTDESK_PARADIGM",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn missing_path(dir: &TempDir) -> LoadOptions {
        LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            ..LoadOptions::default()
        }
    }

    #[test]
    fn defaults_match_reference_thresholds() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let config = AppConfig::load(missing_path(&dir))
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.agent.paradigm == Paradigm::Hybrid, "default paradigm should be hybrid")?;
        ensure(
            config.agent.perception == PerceptionBackend::RuleBased,
            "default perception should be rule based",
        )?;
        ensure(config.ethics.biased_term_threshold == 2, "bias threshold should default to 2")?;
        ensure(
            (config.ethics.transparency_floor - 0.30).abs() < f64::EPSILON,
            "transparency floor should default to 0.30",
        )?;
        ensure(
            config.ethics.discriminatory_terms.is_empty(),
            "discriminatory denylist should default to empty",
        )?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("TEST_SUPPORTDESK_PARADIGM", "rule_based");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("supportdesk.toml");
            fs::write(
                &path,
                r#"
[agent]
paradigm = "${TEST_SUPPORTDESK_PARADIGM}"

[ethics]
discriminatory_terms = ["  Slur-One ", ""]
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.agent.paradigm == Paradigm::RuleBased,
                "paradigm should be interpolated from the environment",
            )?;
            ensure(
                config.ethics.discriminatory_terms == vec!["slur-one".to_string()],
                "denylist terms should be trimmed, lower-cased and non-empty",
            )
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("SUPPORTDESK_LOG_LEVEL", "warn");
        env::set_var("SUPPORTDESK_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let config = AppConfig::load(missing_path(&dir))
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("SUPPORTDESK_ETHICS_BIASED_TERM_THRESHOLD", "4");
        env::set_var("SUPPORTDESK_AGENT_PARADIGM", "learning-based");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("supportdesk.toml");
            fs::write(
                &path,
                r#"
[agent]
paradigm = "rule_based"

[ethics]
biased_term_threshold = 3
transparency_floor = 0.4

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    paradigm: Some(Paradigm::Hybrid),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.agent.paradigm == Paradigm::Hybrid, "override paradigm should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.ethics.biased_term_threshold == 4,
                "env threshold should win over file and defaults",
            )?;
            ensure(
                (config.ethics.transparency_floor - 0.4).abs() < f64::EPSILON,
                "file transparency floor should win over default",
            )
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("SUPPORTDESK_ETHICS_TRANSPARENCY_FLOOR", "1.5");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let error = match AppConfig::load(missing_path(&dir)) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("ethics.transparency_floor")
            );
            ensure(has_message, "validation failure should mention ethics.transparency_floor")
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn malformed_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);
        env::set_var("SUPPORTDESK_ETHICS_BIASED_TERM_THRESHOLD", "lots");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let rejected = matches!(
                AppConfig::load(missing_path(&dir)),
                Err(ConfigError::InvalidEnvOverride { ref key, .. })
                    if key == "SUPPORTDESK_ETHICS_BIASED_TERM_THRESHOLD"
            );
            ensure(rejected, "non-numeric threshold should be rejected with the env key")
        })();

        clear_vars(ALL_VARS);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(ALL_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let options = LoadOptions { require_file: true, ..missing_path(&dir) };
        ensure(
            matches!(AppConfig::load(options), Err(ConfigError::MissingConfigFile(_))),
            "missing required file should fail",
        )
    }

    #[test]
    fn paradigm_descriptions_are_distinct() {
        let descriptions = [
            Paradigm::RuleBased.description(),
            Paradigm::LearningBased.description(),
            Paradigm::Hybrid.description(),
        ];
        assert_eq!(descriptions[2], "Combines rule-based and learning-based approaches");
        assert_ne!(descriptions[0], descriptions[1]);
    }
}
