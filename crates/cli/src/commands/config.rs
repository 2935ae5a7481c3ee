use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use supportdesk_core::config::{AppConfig, LoadOptions};
use toml::Value;

const CONFIG_KEYS: [(&str, &[&str]); 7] = [
    ("agent.paradigm", &["SUPPORTDESK_AGENT_PARADIGM"]),
    ("agent.perception", &["SUPPORTDESK_AGENT_PERCEPTION"]),
    ("ethics.biased_term_threshold", &["SUPPORTDESK_ETHICS_BIASED_TERM_THRESHOLD"]),
    ("ethics.transparency_floor", &["SUPPORTDESK_ETHICS_TRANSPARENCY_FLOOR"]),
    ("ethics.discriminatory_terms", &["SUPPORTDESK_ETHICS_DISCRIMINATORY_TERMS"]),
    ("logging.level", &["SUPPORTDESK_LOGGING_LEVEL", "SUPPORTDESK_LOG_LEVEL"]),
    ("logging.format", &["SUPPORTDESK_LOGGING_FORMAT", "SUPPORTDESK_LOG_FORMAT"]),
];

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_keys) in CONFIG_KEYS {
        lines.push(render_line(
            key_path,
            &effective_value(&config, key_path),
            field_source(
                key_path,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        ));
    }

    lines.join("\n")
}

fn effective_value(config: &AppConfig, key_path: &str) -> String {
    match key_path {
        "agent.paradigm" => format!("{:?}", config.agent.paradigm),
        "agent.perception" => format!("{:?}", config.agent.perception),
        "ethics.biased_term_threshold" => config.ethics.biased_term_threshold.to_string(),
        "ethics.transparency_floor" => format!("{:.2}", config.ethics.transparency_floor),
        "ethics.discriminatory_terms" if config.ethics.discriminatory_terms.is_empty() => {
            "<none>".to_string()
        }
        "ethics.discriminatory_terms" => config.ethics.discriminatory_terms.join(","),
        "logging.level" => config.logging.level.clone(),
        "logging.format" => format!("{:?}", config.logging.format),
        _ => "<unknown>".to_string(),
    }
}

fn detect_config_path() -> Option<PathBuf> {
    ["supportdesk.toml", "config/supportdesk.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
