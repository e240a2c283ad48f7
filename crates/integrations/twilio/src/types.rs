use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Form-encoded request body for the Twilio Messages API.
///
/// Twilio expects `application/x-www-form-urlencoded` rather than JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    /// Destination address (E.164 number or `whatsapp:+...`).
    #[serde(rename = "To")]
    pub to: String,

    /// Sender number or messaging service SID.
    #[serde(rename = "From")]
    pub from: String,

    /// Message body text.
    #[serde(rename = "Body")]
    pub body: String,

    /// Optional media URL for MMS / WhatsApp media.
    #[serde(rename = "MediaUrl", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// URL Twilio calls with delivery status updates.
    #[serde(rename = "StatusCallback", skip_serializing_if = "Option::is_none")]
    pub status_callback: Option<String>,
}

/// Form-encoded request body for the Twilio Calls API.
///
/// Exactly one of `url` and `twiml` must be set.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCallRequest {
    #[serde(rename = "To")]
    pub to: String,

    #[serde(rename = "From")]
    pub from: String,

    /// URL returning the TwiML instructions for the call.
    #[serde(rename = "Url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Inline TwiML instructions for the call.
    #[serde(rename = "Twiml", skip_serializing_if = "Option::is_none")]
    pub twiml: Option<String>,

    #[serde(rename = "StatusCallback", skip_serializing_if = "Option::is_none")]
    pub status_callback: Option<String>,
}

/// A Message resource as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResource {
    pub sid: String,
    pub status: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub date_sent: Option<String>,
    /// Price as Twilio formats it (e.g. `"-0.00750"`); `null` until billed.
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub price_unit: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl MessageResource {
    /// The `status` field as a [`MessageStatus`].
    pub fn status_kind(&self) -> MessageStatus {
        MessageStatus::parse(&self.status)
    }
}

/// A Call resource as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallResource {
    pub sid: String,
    pub status: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Call length in seconds, as a string; `null` while in progress.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub price_unit: Option<String>,
}

impl CallResource {
    /// The `status` field as a [`CallStatus`].
    pub fn status_kind(&self) -> CallStatus {
        CallStatus::parse(&self.status)
    }
}

/// The Account resource, fetched to check credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResource {
    pub sid: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Error body Twilio sends with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub more_info: Option<String>,
}

/// One page of a list response.
pub trait Page: DeserializeOwned {
    type Item;

    /// Split into the page's records and the relative URI of the next page.
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<MessageResource>,
    #[serde(default)]
    pub next_page_uri: Option<String>,
}

impl Page for MessagePage {
    type Item = MessageResource;

    fn into_parts(self) -> (Vec<MessageResource>, Option<String>) {
        (self.messages, self.next_page_uri)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallPage {
    #[serde(default)]
    pub calls: Vec<CallResource>,
    #[serde(default)]
    pub next_page_uri: Option<String>,
}

impl Page for CallPage {
    type Item = CallResource;

    fn into_parts(self) -> (Vec<CallResource>, Option<String>) {
        (self.calls, self.next_page_uri)
    }
}

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Queued,
    Sending,
    Sent,
    Failed,
    Delivered,
    Undelivered,
    Receiving,
    Received,
    Accepted,
    Scheduled,
    Read,
    PartiallyDelivered,
    Canceled,
    /// A status this crate does not know about yet.
    Unknown,
}

impl MessageStatus {
    /// Parse a status string as Twilio reports it, e.g. `"delivered"`.
    /// Unrecognised values map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "sending" => Self::Sending,
            "sent" => Self::Sent,
            "failed" => Self::Failed,
            "delivered" => Self::Delivered,
            "undelivered" => Self::Undelivered,
            "receiving" => Self::Receiving,
            "received" => Self::Received,
            "accepted" => Self::Accepted,
            "scheduled" => Self::Scheduled,
            "read" => Self::Read,
            "partially_delivered" => Self::PartiallyDelivered,
            "canceled" => Self::Canceled,
            _ => Self::Unknown,
        }
    }

    /// The wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Delivered => "delivered",
            Self::Undelivered => "undelivered",
            Self::Receiving => "receiving",
            Self::Received => "received",
            Self::Accepted => "accepted",
            Self::Scheduled => "scheduled",
            Self::Read => "read",
            Self::PartiallyDelivered => "partially_delivered",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }

    /// Whether Twilio will report no further status changes.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Delivered
                | Self::Undelivered
                | Self::Failed
                | Self::Received
                | Self::Read
                | Self::Canceled
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a voice call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Queued,
    Initiated,
    Ringing,
    InProgress,
    Completed,
    Busy,
    Failed,
    NoAnswer,
    Canceled,
    Unknown,
}

impl CallStatus {
    /// Parse a status string as Twilio reports it, e.g. `"in-progress"`.
    /// Unrecognised values map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "queued" => Self::Queued,
            "initiated" => Self::Initiated,
            "ringing" => Self::Ringing,
            "in-progress" => Self::InProgress,
            "completed" => Self::Completed,
            "busy" => Self::Busy,
            "failed" => Self::Failed,
            "no-answer" => Self::NoAnswer,
            "canceled" => Self::Canceled,
            _ => Self::Unknown,
        }
    }

    /// The wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Initiated => "initiated",
            Self::Ringing => "ringing",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Busy => "busy",
            Self::Failed => "failed",
            Self::NoAnswer => "no-answer",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the call has ended.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Busy | Self::Failed | Self::NoAnswer | Self::Canceled
        )
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
