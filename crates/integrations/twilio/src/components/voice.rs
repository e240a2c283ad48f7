use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, instrument, warn};
use twilink_component::{Component, ComponentError, ComponentSpec, PortSpec, Ports};

use super::{CLIENT_INPUT, list_limit, resolve_session};
use crate::config::Environment;
use crate::types::{CallResource, CallStatus, CreateCallRequest};

static MAKE_CALL: ComponentSpec = ComponentSpec {
    name: "twilio_make_call",
    description: "Place an outbound call driven by a TwiML URL or inline TwiML",
    inputs: &[
        CLIENT_INPUT,
        PortSpec::required("from_number", "Twilio number to call from"),
        PortSpec::required("to_number", "Number to call"),
        PortSpec::optional("twiml_url", "URL returning TwiML instructions"),
        PortSpec::optional("twiml", "Inline TwiML instructions (e.g. from twiml_say)"),
        PortSpec::optional("status_callback", "URL for call status updates"),
    ],
    outputs: &[
        PortSpec::optional("call_sid", "SID of the initiated call"),
        PortSpec::optional("status", "Initial call status"),
    ],
};

static GET_CALL_STATUS: ComponentSpec = ComponentSpec {
    name: "twilio_get_call_status",
    description: "Fetch the current status of a call",
    inputs: &[
        CLIENT_INPUT,
        PortSpec::required("call_sid", "SID of the call to check"),
    ],
    outputs: &[
        PortSpec::optional("status", "Call status"),
        PortSpec::optional("terminal", "Whether the status is final"),
        PortSpec::optional("duration", "Call length in seconds, once finished"),
    ],
};

static LIST_CALLS: ComponentSpec = ComponentSpec {
    name: "twilio_list_calls",
    description: "List recent calls on the account",
    inputs: &[
        CLIENT_INPUT,
        PortSpec::optional("limit", "Maximum number of calls (default 50)"),
    ],
    outputs: &[PortSpec::optional("calls", "List of call records")],
};

/// Places a call through the Calls resource.
pub struct MakeCall {
    env: Arc<dyn Environment>,
}

impl MakeCall {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for MakeCall {
    fn spec(&self) -> &'static ComponentSpec {
        &MAKE_CALL
    }

    #[instrument(skip_all, fields(component = "twilio_make_call"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let request = CreateCallRequest {
            to: inputs.require_string("to_number")?,
            from: inputs.require_string("from_number")?,
            url: inputs.string("twiml_url")?,
            twiml: inputs.string("twiml")?,
            status_callback: inputs.string("status_callback")?,
        };
        if request.url.is_some() == request.twiml.is_some() {
            return Err(ComponentError::InvalidInput(
                "set exactly one of 'twiml_url' or 'twiml'".into(),
            ));
        }

        let client = resolve_session(inputs, self.env.as_ref())?;
        let call = client.create_call(&request).await?;
        info!(call_sid = %call.sid, status = %call.status, "call created");

        Ok(Ports::new()
            .with("call_sid", call.sid)
            .with("status", call.status))
    }
}

/// Fetches a call and reports its status.
pub struct GetCallStatus {
    env: Arc<dyn Environment>,
}

impl GetCallStatus {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for GetCallStatus {
    fn spec(&self) -> &'static ComponentSpec {
        &GET_CALL_STATUS
    }

    #[instrument(skip_all, fields(component = "twilio_get_call_status"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let sid = inputs.require_string("call_sid")?;
        let client = resolve_session(inputs, self.env.as_ref())?;
        let call = client.fetch_call(&sid).await?;

        let kind = call.status_kind();
        if kind == CallStatus::Unknown {
            warn!(status = %call.status, "unrecognised call status");
        }

        Ok(Ports::new()
            .with("status", call.status)
            .with("terminal", kind.is_terminal())
            .with("duration", call.duration))
    }
}

/// Lists recent calls as flat records.
pub struct ListCalls {
    env: Arc<dyn Environment>,
}

impl ListCalls {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for ListCalls {
    fn spec(&self) -> &'static ComponentSpec {
        &LIST_CALLS
    }

    #[instrument(skip_all, fields(component = "twilio_list_calls"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let limit = list_limit(inputs)?;
        let client = resolve_session(inputs, self.env.as_ref())?;
        let calls = client.list_calls(limit).await?;
        let records: Vec<Value> = calls.iter().map(call_record).collect();
        Ok(Ports::new().with("calls", Value::Array(records)))
    }
}

fn call_record(call: &CallResource) -> Value {
    json!({
        "sid": call.sid,
        "from": call.from,
        "to": call.to,
        "status": call.status,
        "start_time": call.start_time,
        "duration": call.duration,
        "price": call.price,
    })
}
