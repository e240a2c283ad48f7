use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, instrument, warn};
use twilink_component::{Component, ComponentError, ComponentSpec, PortSpec, Ports};

use super::{CLIENT_INPUT, list_limit, resolve_session};
use crate::config::Environment;
use crate::types::{CreateMessageRequest, MessageResource, MessageStatus};

const WHATSAPP_PREFIX: &str = "whatsapp:";

const SEND_OUTPUTS: &[PortSpec] = &[
    PortSpec::optional("message_sid", "SID of the created message"),
    PortSpec::optional("status", "Initial delivery status"),
];

static SEND_SMS: ComponentSpec = ComponentSpec {
    name: "twilio_send_sms",
    description: "Send an SMS (or MMS when media_url is set)",
    inputs: &[
        CLIENT_INPUT,
        PortSpec::required("from_number", "Twilio number to send from"),
        PortSpec::required("to_number", "Recipient phone number"),
        PortSpec::required("message", "Message text"),
        PortSpec::optional("media_url", "Public URL of media to attach"),
        PortSpec::optional("status_callback", "URL for delivery status updates"),
    ],
    outputs: SEND_OUTPUTS,
};

static SEND_WHATSAPP: ComponentSpec = ComponentSpec {
    name: "twilio_send_whatsapp",
    description: "Send a WhatsApp message",
    inputs: &[
        CLIENT_INPUT,
        PortSpec::required(
            "from_number",
            "Twilio WhatsApp sender (whatsapp:+1234567890; prefix added if missing)",
        ),
        PortSpec::required(
            "to_number",
            "Recipient WhatsApp number (whatsapp:+1234567890; prefix added if missing)",
        ),
        PortSpec::required("message", "Message text"),
        PortSpec::optional("media_url", "Public URL of media to attach"),
        PortSpec::optional("status_callback", "URL for delivery status updates"),
    ],
    outputs: SEND_OUTPUTS,
};

static GET_MESSAGE_STATUS: ComponentSpec = ComponentSpec {
    name: "twilio_get_message_status",
    description: "Fetch the current status of a message",
    inputs: &[
        CLIENT_INPUT,
        PortSpec::required("message_sid", "SID of the message to check"),
    ],
    outputs: &[
        PortSpec::optional("status", "Message status"),
        PortSpec::optional("terminal", "Whether the status is final"),
        PortSpec::optional("error_code", "Twilio error code for failed messages"),
        PortSpec::optional("error_message", "Twilio error text for failed messages"),
    ],
};

static LIST_MESSAGES: ComponentSpec = ComponentSpec {
    name: "twilio_list_messages",
    description: "List recent messages on the account",
    inputs: &[
        CLIENT_INPUT,
        PortSpec::optional("limit", "Maximum number of messages (default 50)"),
    ],
    outputs: &[PortSpec::optional("messages", "List of message records")],
};

/// Sends an SMS through the Messages resource.
pub struct SendSms {
    env: Arc<dyn Environment>,
}

impl SendSms {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for SendSms {
    fn spec(&self) -> &'static ComponentSpec {
        &SEND_SMS
    }

    #[instrument(skip_all, fields(component = "twilio_send_sms"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let request = message_request(inputs, |n| n)?;
        send(inputs, self.env.as_ref(), &request).await
    }
}

/// Sends a WhatsApp message through the Messages resource.
///
/// Twilio routes a message to WhatsApp when both numbers carry the
/// `whatsapp:` channel prefix; it is added here when missing.
pub struct SendWhatsApp {
    env: Arc<dyn Environment>,
}

impl SendWhatsApp {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for SendWhatsApp {
    fn spec(&self) -> &'static ComponentSpec {
        &SEND_WHATSAPP
    }

    #[instrument(skip_all, fields(component = "twilio_send_whatsapp"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let request = message_request(inputs, whatsapp_address)?;
        send(inputs, self.env.as_ref(), &request).await
    }
}

fn whatsapp_address(number: String) -> String {
    if number.starts_with(WHATSAPP_PREFIX) {
        number
    } else {
        format!("{WHATSAPP_PREFIX}{number}")
    }
}

fn message_request(
    inputs: &Ports,
    address: impl Fn(String) -> String,
) -> Result<CreateMessageRequest, ComponentError> {
    Ok(CreateMessageRequest {
        to: address(inputs.require_string("to_number")?),
        from: address(inputs.require_string("from_number")?),
        body: inputs.require_string("message")?,
        media_url: inputs.string("media_url")?,
        status_callback: inputs.string("status_callback")?,
    })
}

async fn send(
    inputs: &Ports,
    env: &dyn Environment,
    request: &CreateMessageRequest,
) -> Result<Ports, ComponentError> {
    let client = resolve_session(inputs, env)?;
    let message = client.create_message(request).await?;
    info!(message_sid = %message.sid, status = %message.status, "message created");
    Ok(Ports::new()
        .with("message_sid", message.sid)
        .with("status", message.status))
}

/// Fetches a message and reports its status.
pub struct GetMessageStatus {
    env: Arc<dyn Environment>,
}

impl GetMessageStatus {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for GetMessageStatus {
    fn spec(&self) -> &'static ComponentSpec {
        &GET_MESSAGE_STATUS
    }

    #[instrument(skip_all, fields(component = "twilio_get_message_status"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let sid = inputs.require_string("message_sid")?;
        let client = resolve_session(inputs, self.env.as_ref())?;
        let message = client.fetch_message(&sid).await?;

        let kind = message.status_kind();
        if kind == MessageStatus::Unknown {
            warn!(status = %message.status, "unrecognised message status");
        }

        Ok(Ports::new()
            .with("status", message.status)
            .with("terminal", kind.is_terminal())
            .with("error_code", message.error_code.map_or(Value::Null, Value::from))
            .with("error_message", message.error_message))
    }
}

/// Lists recent messages as flat records.
pub struct ListMessages {
    env: Arc<dyn Environment>,
}

impl ListMessages {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Self { env }
    }
}

impl Component for ListMessages {
    fn spec(&self) -> &'static ComponentSpec {
        &LIST_MESSAGES
    }

    #[instrument(skip_all, fields(component = "twilio_list_messages"))]
    async fn execute(&self, inputs: &Ports) -> Result<Ports, ComponentError> {
        let limit = list_limit(inputs)?;
        let client = resolve_session(inputs, self.env.as_ref())?;
        let messages = client.list_messages(limit).await?;
        let records: Vec<Value> = messages.iter().map(message_record).collect();
        Ok(Ports::new().with("messages", Value::Array(records)))
    }
}

fn message_record(msg: &MessageResource) -> Value {
    json!({
        "sid": msg.sid,
        "from": msg.from,
        "to": msg.to,
        "body": msg.body,
        "status": msg.status,
        "date_sent": msg.date_sent,
        "price": msg.price,
    })
}

#[cfg(test)]
mod tests {
    use twilink_component::Handle;

    use super::*;
    use crate::client::TwilioClient;
    use crate::components::CLIENT_PORT;
    use crate::components::testing::{empty_env, mock_env};
    use crate::config::TwilioConfig;
    use crate::test_support::MockTwilioServer;

    fn sms_inputs() -> Ports {
        Ports::new()
            .with("from_number", "+15551234567")
            .with("to_number", "+15559876543")
            .with("message", "Hello!")
    }

    #[tokio::test]
    async fn send_sms_returns_sid_and_status() {
        let server = MockTwilioServer::start().await;
        let component = SendSms::new(mock_env(&server.base_url));
        let requests = server.serve(vec![(201, r#"{"sid":"SM123","status":"queued"}"#)]);

        let outputs = component.execute(&sms_inputs()).await.unwrap();
        let requests = requests.await.unwrap();

        assert_eq!(outputs.string("message_sid").unwrap().as_deref(), Some("SM123"));
        assert_eq!(outputs.string("status").unwrap().as_deref(), Some("queued"));
        let body = &requests[0].body;
        assert!(body.contains("From=%2B15551234567"));
        assert!(body.contains("Body=Hello%21"));
        assert!(!body.contains("MediaUrl"));
    }

    #[tokio::test]
    async fn send_sms_uses_connected_session() {
        let server = MockTwilioServer::start().await;
        let client = TwilioClient::new(
            TwilioConfig::new("ACsession", "token").with_api_base_url(&server.base_url),
        )
        .unwrap();
        let component = SendSms::new(empty_env());
        let requests = server.serve(vec![(201, r#"{"sid":"SM1","status":"queued"}"#)]);

        let inputs = sms_inputs()
            .with(CLIENT_PORT, Handle::new(client))
            .with("media_url", "https://example.com/a.png");
        component.execute(&inputs).await.unwrap();
        let requests = requests.await.unwrap();

        assert_eq!(requests[0].path, "/2010-04-01/Accounts/ACsession/Messages.json");
        assert!(requests[0].body.contains("MediaUrl="));
    }

    #[tokio::test]
    async fn send_sms_without_session_or_env_fails() {
        let component = SendSms::new(empty_env());
        let err = component.execute(&sms_inputs()).await.unwrap_err();
        assert!(matches!(err, ComponentError::Configuration(_)));
    }

    #[tokio::test]
    async fn send_whatsapp_adds_channel_prefix() {
        let server = MockTwilioServer::start().await;
        let component = SendWhatsApp::new(mock_env(&server.base_url));
        let requests = server.serve(vec![(201, r#"{"sid":"SM777","status":"queued"}"#)]);

        let inputs = Ports::new()
            .with("from_number", "whatsapp:+14155238886")
            .with("to_number", "+15559876543")
            .with("message", "Hi");
        let outputs = component.execute(&inputs).await.unwrap();
        let requests = requests.await.unwrap();

        assert_eq!(outputs.string("message_sid").unwrap().as_deref(), Some("SM777"));
        let body = &requests[0].body;
        assert!(body.contains("To=whatsapp%3A%2B15559876543"), "{body}");
        assert!(body.contains("From=whatsapp%3A%2B14155238886"), "{body}");
        assert!(!body.contains("whatsapp%3Awhatsapp"), "{body}");
    }

    #[test]
    fn whatsapp_address_is_idempotent() {
        assert_eq!(whatsapp_address("+1555".into()), "whatsapp:+1555");
        assert_eq!(whatsapp_address("whatsapp:+1555".into()), "whatsapp:+1555");
    }

    #[tokio::test]
    async fn get_message_status_reports_failure_details() {
        let server = MockTwilioServer::start().await;
        let component = GetMessageStatus::new(mock_env(&server.base_url));
        let requests = server.serve(vec![(
            200,
            r#"{"sid":"SM9","status":"undelivered","error_code":30003,"error_message":"Unreachable destination handset"}"#,
        )]);

        let outputs = component
            .execute(&Ports::new().with("message_sid", "SM9"))
            .await
            .unwrap();
        let requests = requests.await.unwrap();

        assert_eq!(requests[0].path, "/2010-04-01/Accounts/ACenv/Messages/SM9.json");
        assert_eq!(outputs.string("status").unwrap().as_deref(), Some("undelivered"));
        assert_eq!(outputs.bool("terminal").unwrap(), Some(true));
        assert_eq!(outputs.u64("error_code").unwrap(), Some(30003));
        assert_eq!(
            outputs.string("error_message").unwrap().as_deref(),
            Some("Unreachable destination handset")
        );
    }

    #[tokio::test]
    async fn get_message_status_in_flight() {
        let server = MockTwilioServer::start().await;
        let component = GetMessageStatus::new(mock_env(&server.base_url));
        let requests = server.serve(vec![(200, r#"{"sid":"SM1","status":"sending"}"#)]);

        let outputs = component
            .execute(&Ports::new().with("message_sid", "SM1"))
            .await
            .unwrap();
        requests.await.unwrap();

        assert_eq!(outputs.bool("terminal").unwrap(), Some(false));
        assert!(!outputs.is_set("error_code"));
    }

    #[tokio::test]
    async fn list_messages_flattens_records() {
        let server = MockTwilioServer::start().await;
        let component = ListMessages::new(mock_env(&server.base_url));
        let requests = server.serve(vec![(
            200,
            r#"{"messages":[{"sid":"SM1","status":"delivered","from":"+1555","to":"+1666",
                "body":"hi","date_sent":"Thu, 30 Jul 2015 20:12:33 +0000","price":"-0.00750",
                "price_unit":"USD"}],"next_page_uri":null}"#,
        )]);

        let outputs = component
            .execute(&Ports::new().with("limit", 10_u64))
            .await
            .unwrap();
        let requests = requests.await.unwrap();

        assert!(requests[0].path.ends_with("Messages.json?PageSize=10"));
        let messages = outputs.get("messages").unwrap().to_json();
        assert_eq!(
            messages,
            json!([{
                "sid": "SM1",
                "from": "+1555",
                "to": "+1666",
                "body": "hi",
                "status": "delivered",
                "date_sent": "Thu, 30 Jul 2015 20:12:33 +0000",
                "price": "-0.00750",
            }])
        );
    }

    #[tokio::test]
    async fn list_messages_defaults_to_fifty() {
        let server = MockTwilioServer::start().await;
        let component = ListMessages::new(mock_env(&server.base_url));
        let requests = server.serve(vec![(200, r#"{"messages":[]}"#)]);

        component.execute(&Ports::new()).await.unwrap();
        let requests = requests.await.unwrap();
        assert!(requests[0].path.ends_with("PageSize=50"));
    }
}
