//! Workflow components wrapping one Twilio call or one TwiML builder each.

pub mod auth;
pub mod messaging;
pub mod twiml;
pub mod voice;

use std::sync::Arc;

use tracing::debug;
use twilink_component::{ComponentError, ComponentRegistry, PortSpec, Ports};

use crate::client::TwilioClient;
use crate::config::{Environment, TwilioConfig};

pub use auth::TwilioAuth;
pub use messaging::{GetMessageStatus, ListMessages, SendSms, SendWhatsApp};
pub use twiml::{TwimlDial, TwimlGather, TwimlMessage, TwimlPlay, TwimlSay};
pub use voice::{GetCallStatus, ListCalls, MakeCall};

/// Port carrying the shared Twilio session.
pub const CLIENT_PORT: &str = "client";

/// Records returned by list components when `limit` is not set.
pub const DEFAULT_LIST_LIMIT: usize = 50;

pub(crate) const CLIENT_INPUT: PortSpec = PortSpec::optional(
    CLIENT_PORT,
    "Twilio session from twilio_auth; built from the environment when unconnected",
);

/// Register every Twilio and TwiML component.
///
/// Session-taking components fall back to `env` for credentials when their
/// `client` port is not connected.
pub fn register_all(registry: &mut ComponentRegistry, env: Arc<dyn Environment>) {
    registry.register(Arc::new(TwilioAuth::new(Arc::clone(&env))));
    registry.register(Arc::new(SendSms::new(Arc::clone(&env))));
    registry.register(Arc::new(SendWhatsApp::new(Arc::clone(&env))));
    registry.register(Arc::new(GetMessageStatus::new(Arc::clone(&env))));
    registry.register(Arc::new(ListMessages::new(Arc::clone(&env))));
    registry.register(Arc::new(MakeCall::new(Arc::clone(&env))));
    registry.register(Arc::new(GetCallStatus::new(Arc::clone(&env))));
    registry.register(Arc::new(ListCalls::new(env)));
    registry.register(Arc::new(TwimlSay));
    registry.register(Arc::new(TwimlPlay));
    registry.register(Arc::new(TwimlDial));
    registry.register(Arc::new(TwimlGather));
    registry.register(Arc::new(TwimlMessage));
}

/// Use the session on the `client` port, or build one from the environment.
pub(crate) fn resolve_session(
    inputs: &Ports,
    env: &dyn Environment,
) -> Result<Arc<TwilioClient>, ComponentError> {
    if let Some(handle) = inputs.handle(CLIENT_PORT)? {
        return handle.downcast::<TwilioClient>().ok_or_else(|| {
            ComponentError::InvalidInput(format!(
                "input '{CLIENT_PORT}' must be a Twilio session, got {}",
                handle.short_type_name()
            ))
        });
    }
    debug!("no session connected, building one from the environment");
    let config = TwilioConfig::from_environment(env)?;
    Ok(Arc::new(TwilioClient::new(config)?))
}

/// Read an optional `limit` port, defaulting to [`DEFAULT_LIST_LIMIT`].
pub(crate) fn list_limit(inputs: &Ports) -> Result<usize, ComponentError> {
    match inputs.u64("limit")? {
        None => Ok(DEFAULT_LIST_LIMIT),
        Some(n) => usize::try_from(n)
            .map_err(|_| ComponentError::InvalidInput(format!("limit {n} is too large"))),
    }
}

/// Read an optional small integer port (loop counts, timeouts, digits).
pub(crate) fn optional_u32(inputs: &Ports, name: &str) -> Result<Option<u32>, ComponentError> {
    inputs
        .u64(name)?
        .map(|n| {
            u32::try_from(n).map_err(|_| {
                ComponentError::InvalidInput(format!("input '{name}' value {n} is too large"))
            })
        })
        .transpose()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::config::{ACCOUNT_SID_VAR, API_BASE_URL_VAR, AUTH_TOKEN_VAR, Environment};

    /// An environment pointing sessions at a mock server.
    pub fn mock_env(base_url: &str) -> Arc<dyn Environment> {
        let vars: HashMap<String, String> = [
            (ACCOUNT_SID_VAR, "ACenv"),
            (AUTH_TOKEN_VAR, "envtoken"),
            (API_BASE_URL_VAR, base_url),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        Arc::new(vars)
    }

    /// An environment with no variables at all.
    pub fn empty_env() -> Arc<dyn Environment> {
        Arc::new(HashMap::<String, String>::new())
    }
}
