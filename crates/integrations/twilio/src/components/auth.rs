use std::sync::Arc;

use tracing::{info, instrument};
use twilink_component::{Component, ComponentError, ComponentSpec, Handle, PortSpec, Ports};

use super::CLIENT_PORT;
use crate::client::TwilioClient;
use crate::config::{Environment, TwilioConfig};

static SPEC: ComponentSpec = ComponentSpec {
    name: "twilio_auth",
    description: "Create a Twilio session from explicit credentials or \
                  TWILIO_ACCOUNT_SID / TWILIO_AUTH_TOKEN",
    inputs: &[
        PortSpec::optional("account_sid", "Twilio Account SID"),
        PortSpec::optional("auth_token", "Twilio Auth Token"),
        PortSpec::optional(
            "verify",
            "Fetch the account once so bad credentials fail here",
        ),
    ],
    outputs: &[PortSpec::optional(CLIENT_PORT, "Shared Twilio session")],
};

/// Builds the session every other Twilio component reuses.
///
/// Explicit credentials are used only when both are given; otherwise the
/// environment supplies them.
pub struct TwilioAuth {
    env: Arc<dyn Environment>,
}

impl TwilioAuth {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for TwilioAuth {
    fn spec(&self) -> &'static ComponentSpec {
        &SPEC
    }

    #[instrument(skip_all, fields(component = "twilio_auth"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let config = TwilioConfig::resolve(
            inputs.string("account_sid")?,
            inputs.string("auth_token")?,
            self.env.as_ref(),
        )?;
        let client = TwilioClient::new(config)?;

        if inputs.bool("verify")?.unwrap_or(false) {
            let account = client.fetch_account().await?;
            info!(
                account_sid = %account.sid,
                status = account.status.as_deref().unwrap_or("unknown"),
                "Twilio credentials verified"
            );
        }

        info!(account_sid = %client.account_sid(), "Twilio session created");
        Ok(Ports::new().with(CLIENT_PORT, Handle::new(client)))
    }
}
