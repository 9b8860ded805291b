use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use portside_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// Effective config key, its rendered value, and the env var that can set it.
struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file_path = detect_config_path(options.config_path.as_deref());
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(&field, file_doc.as_ref(), file_path.as_deref());
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }
    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let vector_stores = if config.llm.vector_store_ids.is_empty() {
        "<none>".to_string()
    } else {
        config.llm.vector_store_ids.join(",")
    };

    vec![
        Field {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["PORTSIDE_DATABASE_URL"],
        },
        Field {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            env_keys: &["PORTSIDE_DATABASE_MAX_CONNECTIONS"],
        },
        Field {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            env_keys: &["PORTSIDE_DATABASE_TIMEOUT_SECS"],
        },
        Field {
            key: "llm.provider",
            value: format!("{:?}", config.llm.provider),
            env_keys: &["PORTSIDE_LLM_PROVIDER"],
        },
        Field {
            key: "llm.model",
            value: config.llm.model.clone(),
            env_keys: &["PORTSIDE_LLM_MODEL"],
        },
        Field {
            key: "llm.base_url",
            value: config.llm.base_url.clone(),
            env_keys: &["PORTSIDE_LLM_BASE_URL"],
        },
        Field {
            key: "llm.api_key",
            value: api_key.to_string(),
            env_keys: &["PORTSIDE_LLM_API_KEY", "OPENAI_API_KEY"],
        },
        Field {
            key: "llm.timeout_secs",
            value: config.llm.timeout_secs.to_string(),
            env_keys: &["PORTSIDE_LLM_TIMEOUT_SECS"],
        },
        Field {
            key: "llm.vector_store_ids",
            value: vector_stores,
            env_keys: &["PORTSIDE_LLM_VECTOR_STORE_IDS"],
        },
        Field {
            key: "observability.log_file",
            value: config.observability.log_file.display().to_string(),
            env_keys: &["PORTSIDE_OBSERVABILITY_LOG_FILE"],
        },
        Field {
            key: "observability.export_path",
            value: config.observability.export_path.display().to_string(),
            env_keys: &["PORTSIDE_OBSERVABILITY_EXPORT_PATH"],
        },
        Field {
            key: "observability.top_questions",
            value: config.observability.top_questions.to_string(),
            env_keys: &["PORTSIDE_OBSERVABILITY_TOP_QUESTIONS"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["PORTSIDE_LOGGING_LEVEL", "PORTSIDE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["PORTSIDE_LOGGING_FORMAT", "PORTSIDE_LOG_FORMAT"],
        },
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    [PathBuf::from("portside.toml"), PathBuf::from("config/portside.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    if let Some(env_key) = field.env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if file_doc.is_some_and(|doc| contains_path(doc, field.key)) {
        let file_path = file_path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "config file".to_string());
        return format!("file ({file_path})");
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
