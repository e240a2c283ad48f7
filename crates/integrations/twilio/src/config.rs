use std::collections::HashMap;
use std::time::Duration;

use crate::client::validate_sid;
use crate::error::TwilioError;

/// Environment variable holding the Account SID.
pub const ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";
/// Environment variable holding the Auth Token.
pub const AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";
/// Optional override of the REST API base URL.
pub const API_BASE_URL_VAR: &str = "TWILIO_API_BASE_URL";
/// Optional HTTP timeout in whole seconds.
pub const TIMEOUT_SECS_VAR: &str = "TWILIO_TIMEOUT_SECS";

pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of environment variables.
///
/// Components read credentials through this trait so that the process
/// environment can be swapped for a fixed map (config files, tests).
pub trait Environment: Send + Sync {
    /// Returns the variable's value, or `None` if unset or empty.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Configuration for a Twilio session.
#[derive(Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID used to authenticate API requests.
    pub account_sid: String,

    /// Twilio Auth Token used for HTTP Basic authentication.
    pub auth_token: String,

    /// Base URL for the Twilio REST API. Override this for testing against a
    /// mock server.
    pub api_base_url: String,

    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TwilioConfig {
    /// Create a new configuration with the given Account SID and Auth Token.
    ///
    /// Uses the default Twilio API base URL (`https://api.twilio.com`).
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Override the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from environment variables.
    ///
    /// Reads:
    /// - `TWILIO_ACCOUNT_SID` (required)
    /// - `TWILIO_AUTH_TOKEN` (required)
    /// - `TWILIO_API_BASE_URL` (optional)
    /// - `TWILIO_TIMEOUT_SECS` (optional, default 30)
    pub fn from_environment(env: &dyn Environment) -> Result<Self, TwilioError> {
        match (env.var(ACCOUNT_SID_VAR), env.var(AUTH_TOKEN_VAR)) {
            (Some(sid), Some(token)) => {
                validate_sid(&sid, "account")?;
                Ok(Self::new(sid, token).with_environment_overrides(env))
            }
            _ => Err(TwilioError::MissingCredentials),
        }
    }

    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self, TwilioError> {
        Self::from_environment(&ProcessEnv)
    }

    /// Resolve credentials the way the Auth component does: an explicit
    /// SID/token pair wins when *both* are given, otherwise the environment
    /// supplies them.
    ///
    /// Base URL and timeout overrides always come from the environment.
    pub fn resolve(
        account_sid: Option<String>,
        auth_token: Option<String>,
        env: &dyn Environment,
    ) -> Result<Self, TwilioError> {
        match (account_sid, auth_token) {
            (Some(sid), Some(token)) => {
                validate_sid(&sid, "account")?;
                Ok(Self::new(sid, token).with_environment_overrides(env))
            }
            _ => Self::from_environment(env),
        }
    }

    fn with_environment_overrides(mut self, env: &dyn Environment) -> Self {
        if let Some(url) = env.var(API_BASE_URL_VAR) {
            self = self.with_api_base_url(url);
        }
        if let Some(secs) = env
            .var(TIMEOUT_SECS_VAR)
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }
}
