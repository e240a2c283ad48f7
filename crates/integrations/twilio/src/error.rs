use std::fmt;

use thiserror::Error;
use twilink_component::ComponentError;

/// An error response returned by the Twilio REST API.
///
/// The message, code and documentation link are kept exactly as Twilio sent
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Twilio error code (e.g. `21211` for an invalid "To" number).
    pub code: Option<i64>,
    /// Twilio's error message, or the raw response body.
    pub message: String,
    /// Link to Twilio's documentation for this error code.
    pub more_info: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code {
            write!(f, "[{code}] ")?;
        }
        write!(f, "{} (HTTP {})", self.message, self.status)?;
        if let Some(link) = &self.more_info {
            write!(f, " {link}")?;
        }
        Ok(())
    }
}

/// Errors specific to the Twilio integration.
///
/// These are internal errors that get converted into [`ComponentError`] at
/// the component boundary.
#[derive(Debug, Error)]
pub enum TwilioError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Twilio API returned an error response.
    #[error("Twilio API error: {0}")]
    Api(ApiError),

    /// Neither explicit credentials nor environment variables were available.
    #[error(
        "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN environment variables must be set \
         (or pass account_sid and auth_token explicitly)"
    )]
    MissingCredentials,

    /// A request parameter is unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl TwilioError {
    /// Returns `true` if Twilio answered with HTTP 429.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api(e) if e.status == 429)
    }
}

impl From<TwilioError> for ComponentError {
    fn from(err: TwilioError) -> Self {
        match err {
            TwilioError::Http(e) if e.is_decode() => ComponentError::ExecutionFailed(e.to_string()),
            TwilioError::Http(e) => ComponentError::Connection(e.to_string()),
            TwilioError::Api(e) if e.status == 429 => ComponentError::RateLimited(e.to_string()),
            TwilioError::Api(e) => ComponentError::ExecutionFailed(e.to_string()),
            e @ (TwilioError::MissingCredentials | TwilioError::Client(_)) => {
                ComponentError::Configuration(e.to_string())
            }
            TwilioError::InvalidInput(msg) => ComponentError::InvalidInput(msg),
        }
    }
}
