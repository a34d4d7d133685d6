// src/config.rs
// Explicit configuration struct built from the environment (after dotenvy has
// loaded the chosen .env file). No process-wide singletons; constructors take
// this struct or pieces of it.

use std::path::PathBuf;

use crate::error::ConfigError;

const ACCEPTED_WEBHOOK_PREFIXES: [&str; 2] = ["https://hooks.slack.com/", "https://slack.com/"];
const ACCEPTED_LOG_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

pub const DEFAULT_CHANNEL: &str = "#app-reviews";
pub const DEFAULT_STATE_PATH: &str = "processed_reviews.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Numeric App Store id of the monitored app.
    pub app_id: String,
    pub slack_webhook: String,
    pub slack_channel: String,
    pub days_to_look_back: i64,
    pub log_level: String,
    /// Seen-set file; one per app id.
    pub state_path: PathBuf,
    // App Store Connect credentials; validated on first fetch, not at startup.
    pub key_id: Option<String>,
    pub issuer_id: Option<String>,
    pub private_key: Option<String>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_id = env_nonempty("APP_ID");
        let slack_webhook = env_nonempty("SLACK_WEBHOOK");

        let missing: Vec<&str> = [("APP_ID", &app_id), ("SLACK_WEBHOOK", &slack_webhook)]
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing.join(", ")));
        }
        let app_id = app_id.unwrap_or_default();
        let slack_webhook = slack_webhook.unwrap_or_default();

        if !app_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::InvalidAppId);
        }
        if !ACCEPTED_WEBHOOK_PREFIXES
            .iter()
            .any(|p| slack_webhook.starts_with(p))
        {
            return Err(ConfigError::InvalidWebhook);
        }

        let days_to_look_back = match env_nonempty("DAYS_TO_LOOK_BACK") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|d| *d >= 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "DAYS_TO_LOOK_BACK",
                    reason: format!("{raw:?} is not a non-negative integer"),
                })?,
            None => 1,
        };

        let log_level = env_nonempty("LOG_LEVEL")
            .map(|v| v.to_ascii_uppercase())
            .unwrap_or_else(|| "INFO".to_string());
        if !ACCEPTED_LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "LOG_LEVEL",
                reason: format!("{log_level:?} is not one of {ACCEPTED_LOG_LEVELS:?}"),
            });
        }

        Ok(Self {
            app_id,
            slack_webhook,
            slack_channel: env_nonempty("SLACK_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            days_to_look_back,
            log_level,
            state_path: env_nonempty("STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            key_id: env_nonempty("KEY_ID"),
            issuer_id: env_nonempty("ISSUER_ID"),
            private_key: env_nonempty("PRIVATE_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const WEBHOOK: &str = "https://hooks.slack.com/services/T000/B000/XXXX";

    fn clear_env() {
        for key in [
            "APP_ID",
            "SLACK_WEBHOOK",
            "SLACK_CHANNEL",
            "DAYS_TO_LOOK_BACK",
            "LOG_LEVEL",
            "STATE_PATH",
            "KEY_ID",
            "ISSUER_ID",
            "PRIVATE_KEY",
        ] {
            env::remove_var(key);
        }
    }

    #[serial_test::serial]
    #[test]
    fn minimal_valid_config_applies_defaults() {
        clear_env();
        env::set_var("APP_ID", "123456789");
        env::set_var("SLACK_WEBHOOK", WEBHOOK);

        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.app_id, "123456789");
        assert_eq!(cfg.slack_channel, DEFAULT_CHANNEL);
        assert_eq!(cfg.days_to_look_back, 1);
        assert_eq!(cfg.log_level, "INFO");
        assert_eq!(cfg.state_path, PathBuf::from(DEFAULT_STATE_PATH));
    }

    #[serial_test::serial]
    #[test]
    fn missing_required_keys_are_named() {
        clear_env();
        match Config::from_env() {
            Err(ConfigError::MissingKeys(keys)) => {
                assert!(keys.contains("APP_ID"));
                assert!(keys.contains("SLACK_WEBHOOK"));
            }
            other => panic!("expected MissingKeys, got {other:?}"),
        }
    }

    #[serial_test::serial]
    #[test]
    fn non_numeric_app_id_is_rejected() {
        clear_env();
        env::set_var("APP_ID", "my-app");
        env::set_var("SLACK_WEBHOOK", WEBHOOK);
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidAppId)));
    }

    #[serial_test::serial]
    #[test]
    fn webhook_must_use_accepted_prefix() {
        clear_env();
        env::set_var("APP_ID", "123");
        env::set_var("SLACK_WEBHOOK", "https://example.com/hook");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidWebhook)));
    }

    #[serial_test::serial]
    #[test]
    fn bad_days_value_is_rejected() {
        clear_env();
        env::set_var("APP_ID", "123");
        env::set_var("SLACK_WEBHOOK", WEBHOOK);
        env::set_var("DAYS_TO_LOOK_BACK", "-2");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue { key: "DAYS_TO_LOOK_BACK", .. })
        ));
    }

    #[serial_test::serial]
    #[test]
    fn log_level_is_uppercased_and_validated() {
        clear_env();
        env::set_var("APP_ID", "123");
        env::set_var("SLACK_WEBHOOK", WEBHOOK);
        env::set_var("LOG_LEVEL", "debug");
        assert_eq!(Config::from_env().unwrap().log_level, "DEBUG");

        env::set_var("LOG_LEVEL", "loud");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue { key: "LOG_LEVEL", .. })
        ));
    }
}
