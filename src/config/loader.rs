use super::error::ConfigError;
use super::{
    AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_TURNS,
    DEFAULT_MCP_SERVER_URL, DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
    ENV_API_KEY, ENV_BASE_URL, ENV_MCP_SERVER_URL, ENV_MODEL, ENV_REASONING_EFFORT,
    ENV_VERBOSITY, ReasoningEffort, Verbosity,
};
use reqwest::Url;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, info};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub model: Option<String>,
    pub openai_base_url: Option<String>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub verbosity: Option<Verbosity>,
    pub request_timeout_secs: Option<u64>,
    pub mcp_server_url: Option<String>,
    pub max_iterations: Option<usize>,
    pub max_turns: Option<usize>,
}

/// Loads `.env` from the working directory, or the given file, into the
/// process environment. Variables already set are left untouched. Only the
/// first call has an effect.
pub fn ensure_env_loaded(path: Option<&Path>) -> Result<(), ConfigError> {
    let mut result = Ok(());
    ENV_LOADER.call_once(|| {
        result = match path {
            Some(path) => dotenvy::from_path(path)
                .map(|_| debug!(path = %path.display(), "Loaded environment file"))
                .map_err(|source| ConfigError::EnvFile {
                    path: path.to_path_buf(),
                    source,
                }),
            None => {
                if let Ok(found) = dotenvy::dotenv() {
                    debug!(path = %found.display(), "Loaded environment file");
                }
                Ok(())
            }
        };
    });
    result
}

/// Load the TOML file (if any) and resolve it against the process environment
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let raw = read_raw_config(path)?;
    resolve(raw, |key| env::var(key).ok())
}

fn read_raw_config(path: Option<&Path>) -> Result<RawConfig, ConfigError> {
    let (config_path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };
    debug!(path = %config_path.display(), "Reading agent configuration file");

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            if explicit {
                return Err(ConfigError::NotFound {
                    path: config_path.to_path_buf(),
                });
            }
            info!("Configuration file not found; using defaults");
            return Ok(RawConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}

/// Combine file values with environment lookups. Environment wins.
pub fn resolve<F>(raw: RawConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingApiKey { var: ENV_API_KEY })?;

    let model = match lookup(ENV_MODEL).or(raw.model) {
        Some(model) => validate_non_empty("model", &model)?,
        None => DEFAULT_MODEL.to_string(),
    };

    let openai_base_url = match lookup(ENV_BASE_URL).or(raw.openai_base_url) {
        Some(url) => validate_url("openai_base_url", &url)?,
        None => DEFAULT_OPENAI_BASE_URL.to_string(),
    };

    let reasoning_effort = match lookup(ENV_REASONING_EFFORT) {
        Some(value) => value
            .parse()
            .map_err(|reason| ConfigError::invalid("reasoning_effort", value, reason))?,
        None => raw.reasoning_effort.unwrap_or_default(),
    };

    let verbosity = match lookup(ENV_VERBOSITY) {
        Some(value) => value
            .parse()
            .map_err(|reason| ConfigError::invalid("verbosity", value, reason))?,
        None => raw.verbosity.unwrap_or_default(),
    };

    let mcp_server_url = match lookup(ENV_MCP_SERVER_URL).or(raw.mcp_server_url) {
        Some(url) => validate_url("mcp_server_url", &url)?,
        None => DEFAULT_MCP_SERVER_URL.to_string(),
    };

    let timeout_secs = raw
        .request_timeout_secs
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    let timeout_secs = validate_positive("request_timeout_secs", timeout_secs as usize)? as u64;

    let max_iterations = validate_positive(
        "max_iterations",
        raw.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
    )?;
    let max_turns = validate_positive("max_turns", raw.max_turns.unwrap_or(DEFAULT_MAX_TURNS))?;

    Ok(AppConfig {
        api_key,
        openai_base_url,
        model,
        reasoning_effort,
        verbosity,
        request_timeout: Duration::from_secs(timeout_secs),
        mcp_server_url,
        max_iterations,
        max_turns,
    })
}

pub(super) fn validate_url(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    let url = Url::parse(trimmed).map_err(|err| ConfigError::invalid(field, value, err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ConfigError::invalid(
            field,
            value,
            format!("unsupported scheme '{other}'"),
        )),
    }
}

pub(super) fn validate_non_empty(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid(field, value, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

pub(super) fn validate_positive(field: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::invalid(field, "0", "must be at least 1"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_api_key_is_set() {
        let config = resolve(RawConfig::default(), env_of(&[(ENV_API_KEY, "sk-test")]))
            .expect("resolves");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.mcp_server_url, DEFAULT_MCP_SERVER_URL);
        assert_eq!(config.reasoning_effort, ReasoningEffort::Low);
        assert_eq!(config.verbosity, Verbosity::Low);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.max_turns, 10);
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = resolve(RawConfig::default(), env_of(&[])).expect_err("must fail");
        assert!(matches!(err, ConfigError::MissingApiKey { var } if var == ENV_API_KEY));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let err =
            resolve(RawConfig::default(), env_of(&[(ENV_API_KEY, "  ")])).expect_err("must fail");
        assert!(matches!(err, ConfigError::MissingApiKey { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let raw = RawConfig {
            model: Some("gpt-file".into()),
            mcp_server_url: Some("http://file.local:1".into()),
            reasoning_effort: Some(ReasoningEffort::High),
            ..RawConfig::default()
        };
        let config = resolve(
            raw,
            env_of(&[
                (ENV_API_KEY, "sk"),
                (ENV_MODEL, "gpt-env"),
                (ENV_MCP_SERVER_URL, "http://127.0.0.1:9000/sse"),
                (ENV_REASONING_EFFORT, "Medium"),
            ]),
        )
        .expect("resolves");
        assert_eq!(config.model, "gpt-env");
        assert_eq!(config.mcp_server_url, "http://127.0.0.1:9000/sse");
        assert_eq!(config.reasoning_effort, ReasoningEffort::Medium);
    }

    #[test]
    fn invalid_verbosity_is_reported() {
        let err = resolve(
            RawConfig::default(),
            env_of(&[(ENV_API_KEY, "sk"), (ENV_VERBOSITY, "loud")]),
        )
        .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidValue { field: "verbosity", .. }));
    }

    #[test]
    fn non_http_server_url_is_rejected() {
        let err = resolve(
            RawConfig::default(),
            env_of(&[(ENV_API_KEY, "sk"), (ENV_MCP_SERVER_URL, "ftp://host")]),
        )
        .expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidValue { field: "mcp_server_url", .. }));
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let raw = RawConfig {
            max_iterations: Some(0),
            ..RawConfig::default()
        };
        let err = resolve(raw, env_of(&[(ENV_API_KEY, "sk")])).expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidValue { field: "max_iterations", .. }));
    }
}
