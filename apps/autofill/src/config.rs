use std::time::Duration;

use anyhow::{Context, Result};

/// Engine tuning loaded from environment variables.
/// Every wait the engine performs is bounded by one of these values.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub dropdown_timeout: Duration,
    /// Whole-session budget checked before each navigation. `None` disables it.
    pub session_timeout: Option<Duration>,
    pub max_steps: u32,
    pub auto_submit: bool,
    pub rust_log: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            settle_delay: Duration::from_millis(500),
            dropdown_timeout: Duration::from_millis(2000),
            session_timeout: Some(Duration::from_secs(300)),
            max_steps: 25,
            auto_submit: false,
            rust_log: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let session_timeout = match optional_millis(&lookup, "AUTOFILL_SESSION_TIMEOUT_MS")? {
            Some(d) if d.is_zero() => None,
            Some(d) => Some(d),
            None => defaults.session_timeout,
        };

        Ok(EngineConfig {
            poll_interval: optional_millis(&lookup, "AUTOFILL_POLL_INTERVAL_MS")?
                .unwrap_or(defaults.poll_interval),
            settle_delay: optional_millis(&lookup, "AUTOFILL_SETTLE_DELAY_MS")?
                .unwrap_or(defaults.settle_delay),
            dropdown_timeout: optional_millis(&lookup, "AUTOFILL_DROPDOWN_TIMEOUT_MS")?
                .unwrap_or(defaults.dropdown_timeout),
            session_timeout,
            max_steps: match lookup("AUTOFILL_MAX_STEPS") {
                Some(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .context("AUTOFILL_MAX_STEPS must be a non-negative integer")?,
                None => defaults.max_steps,
            },
            auto_submit: match lookup("AUTOFILL_AUTO_SUBMIT") {
                Some(raw) => parse_bool(&raw)
                    .with_context(|| format!("AUTOFILL_AUTO_SUBMIT must be a boolean, got '{raw}'"))?,
                None => defaults.auto_submit,
            },
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn optional_millis<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{key} must be a duration in milliseconds"))
        })
        .transpose()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.session_timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.max_steps, 25);
        assert!(!config.auto_submit);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("AUTOFILL_POLL_INTERVAL_MS", "50"),
            ("AUTOFILL_DROPDOWN_TIMEOUT_MS", "750"),
            ("AUTOFILL_MAX_STEPS", "4"),
            ("AUTOFILL_AUTO_SUBMIT", "yes"),
        ]))
        .unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.dropdown_timeout, Duration::from_millis(750));
        assert_eq!(config.max_steps, 4);
        assert!(config.auto_submit);
    }

    #[test]
    fn test_zero_session_timeout_disables_budget() {
        let config =
            EngineConfig::from_lookup(lookup_from(&[("AUTOFILL_SESSION_TIMEOUT_MS", "0")]))
                .unwrap();
        assert_eq!(config.session_timeout, None);
    }

    #[test]
    fn test_invalid_duration_names_variable() {
        let err = EngineConfig::from_lookup(lookup_from(&[("AUTOFILL_SETTLE_DELAY_MS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("AUTOFILL_SETTLE_DELAY_MS"));
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let result = EngineConfig::from_lookup(lookup_from(&[("AUTOFILL_AUTO_SUBMIT", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_dotenv_file_values_are_readable() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AUTOFILL_MAX_STEPS=7").unwrap();
        writeln!(file, "AUTOFILL_SETTLE_DELAY_MS=250").unwrap();

        let pairs: HashMap<String, String> = dotenvy::from_path_iter(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let config = EngineConfig::from_lookup(|key| pairs.get(key).cloned()).unwrap();
        assert_eq!(config.max_steps, 7);
        assert_eq!(config.settle_delay, Duration::from_millis(250));
    }
}
