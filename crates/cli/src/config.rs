use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use twilink_twilio::config::{
    ACCOUNT_SID_VAR, API_BASE_URL_VAR, AUTH_TOKEN_VAR, Environment, ProcessEnv, TIMEOUT_SECS_VAR,
};

/// Contents of a `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub twilio: TwilioSection,
}

/// The `[twilio]` table.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TwilioSection {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for TwilioSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSection")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

impl TwilioSection {
    /// The section as the environment variables it stands in for.
    pub fn into_vars(self) -> HashMap<String, String> {
        [
            (ACCOUNT_SID_VAR, self.account_sid),
            (AUTH_TOKEN_VAR, self.auth_token),
            (API_BASE_URL_VAR, self.api_base_url),
            (TIMEOUT_SECS_VAR, self.timeout_secs.map(|n| n.to_string())),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_owned(), v)))
        .collect()
    }
}

/// Process environment first, then values from the config file.
pub struct LayeredEnv<E = ProcessEnv> {
    primary: E,
    fallback: HashMap<String, String>,
}

impl LayeredEnv {
    pub fn new(fallback: HashMap<String, String>) -> Self {
        Self::with_primary(ProcessEnv, fallback)
    }
}

impl<E: Environment> LayeredEnv<E> {
    pub fn with_primary(primary: E, fallback: HashMap<String, String>) -> Self {
        Self { primary, fallback }
    }
}

impl<E: Environment> Environment for LayeredEnv<E> {
    fn var(&self, key: &str) -> Option<String> {
        self.primary.var(key).or_else(|| self.fallback.var(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn parses_twilio_section() {
        let config: FileConfig = toml::from_str(
            r#"
[twilio]
account_sid = "ACfile"
auth_token = "filetoken"
timeout_secs = 5
"#,
        )
        .unwrap();
        let vars = config.twilio.into_vars();
        assert_eq!(vars.get(ACCOUNT_SID_VAR).map(String::as_str), Some("ACfile"));
        assert_eq!(vars.get(TIMEOUT_SECS_VAR).map(String::as_str), Some("5"));
        assert!(!vars.contains_key(API_BASE_URL_VAR));
    }

    #[test]
    fn empty_file_is_valid() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.twilio.into_vars().is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("[twilio]\nsid = \"AC1\"");
        assert!(result.is_err());
    }

    #[test]
    fn primary_environment_wins() {
        let env = LayeredEnv::with_primary(
            map(&[(ACCOUNT_SID_VAR, "ACprocess")]),
            map(&[(ACCOUNT_SID_VAR, "ACfile"), (AUTH_TOKEN_VAR, "filetoken")]),
        );
        assert_eq!(env.var(ACCOUNT_SID_VAR).as_deref(), Some("ACprocess"));
        assert_eq!(env.var(AUTH_TOKEN_VAR).as_deref(), Some("filetoken"));
        assert_eq!(env.var(API_BASE_URL_VAR), None);
    }

    #[test]
    fn debug_redacts_token() {
        let section = TwilioSection {
            auth_token: Some("hunter2".into()),
            ..TwilioSection::default()
        };
        let rendered = format!("{section:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
