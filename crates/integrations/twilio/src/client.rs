use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::TwilioConfig;
use crate::error::{ApiError, TwilioError};
use crate::types::{
    AccountResource, ApiErrorBody, CallPage, CallResource, CreateCallRequest,
    CreateMessageRequest, MessagePage, MessageResource, Page,
};

/// Largest page size the list endpoints accept.
const MAX_PAGE_SIZE: usize = 1000;

/// An authenticated Twilio session.
///
/// Wraps the account credentials and a pooled HTTP client. A session is
/// created once (by the Auth component) and then shared read-only by every
/// downstream component through an `Arc`.
#[derive(Debug, Clone)]
pub struct TwilioClient {
    config: TwilioConfig,
    http: Client,
}

impl TwilioClient {
    /// Create a session with the configured timeout.
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TwilioError::Client(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// Create a session with a custom HTTP client.
    ///
    /// Useful for sharing a connection pool across sessions.
    pub fn with_http_client(config: TwilioConfig, http: Client) -> Self {
        Self { config, http }
    }

    pub fn account_sid(&self) -> &str {
        &self.config.account_sid
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    /// Build a URL under this account, e.g. `account_url("/Messages.json")`.
    fn account_url(&self, suffix: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}{suffix}",
            self.config.api_base_url, self.config.account_sid
        )
    }

    /// Send a message (SMS, MMS or WhatsApp).
    #[instrument(skip(self, request), fields(provider = "twilio", to = %request.to))]
    pub async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<MessageResource, TwilioError> {
        debug!("creating message");
        let url = self.account_url("/Messages.json");
        self.send(self.http.post(url).form(request)).await
    }

    /// Fetch a single message by SID.
    #[instrument(skip(self), fields(provider = "twilio"))]
    pub async fn fetch_message(&self, sid: &str) -> Result<MessageResource, TwilioError> {
        validate_sid(sid, "message")?;
        let url = self.account_url(&format!("/Messages/{sid}.json"));
        self.send(self.http.get(url)).await
    }

    /// List the most recent messages, following pagination up to `limit`.
    #[instrument(skip(self), fields(provider = "twilio"))]
    pub async fn list_messages(&self, limit: usize) -> Result<Vec<MessageResource>, TwilioError> {
        self.list::<MessagePage>("/Messages.json", limit).await
    }

    /// Place an outbound call.
    #[instrument(skip(self, request), fields(provider = "twilio", to = %request.to))]
    pub async fn create_call(&self, request: &CreateCallRequest) -> Result<CallResource, TwilioError> {
        if request.url.is_some() == request.twiml.is_some() {
            return Err(TwilioError::InvalidInput(
                "exactly one of a TwiML URL or inline TwiML is required".into(),
            ));
        }
        debug!("creating call");
        let url = self.account_url("/Calls.json");
        self.send(self.http.post(url).form(request)).await
    }

    /// Fetch a single call by SID.
    #[instrument(skip(self), fields(provider = "twilio"))]
    pub async fn fetch_call(&self, sid: &str) -> Result<CallResource, TwilioError> {
        validate_sid(sid, "call")?;
        let url = self.account_url(&format!("/Calls/{sid}.json"));
        self.send(self.http.get(url)).await
    }

    /// List the most recent calls, following pagination up to `limit`.
    #[instrument(skip(self), fields(provider = "twilio"))]
    pub async fn list_calls(&self, limit: usize) -> Result<Vec<CallResource>, TwilioError> {
        self.list::<CallPage>("/Calls.json", limit).await
    }

    /// Fetch the account resource. Succeeds only if the credentials are valid.
    #[instrument(skip(self), fields(provider = "twilio"))]
    pub async fn fetch_account(&self) -> Result<AccountResource, TwilioError> {
        self.send(self.http.get(self.account_url(".json"))).await
    }

    async fn list<P: Page>(&self, suffix: &str, limit: usize) -> Result<Vec<P::Item>, TwilioError> {
        let mut items = Vec::new();
        if limit == 0 {
            return Ok(items);
        }

        let page_size = limit.min(MAX_PAGE_SIZE);
        let mut request = self
            .http
            .get(self.account_url(suffix))
            .query(&[("PageSize", page_size)]);

        loop {
            let page: P = self.send(request).await?;
            let (records, next_page_uri) = page.into_parts();
            let added = records.len();
            items.extend(records);
            debug!(fetched = items.len(), limit, "fetched page");

            // An empty page ends the listing even if it links onward.
            match next_page_uri {
                Some(uri) if added > 0 && items.len() < limit => {
                    request = self
                        .http
                        .get(format!("{}{uri}", self.config.api_base_url));
                }
                _ => break,
            }
        }

        items.truncate(limit);
        Ok(items)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TwilioError> {
        let response = request
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
            let message = body.message.unwrap_or_else(|| {
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_owned()
                } else {
                    text
                }
            });
            let err = ApiError {
                status: status.as_u16(),
                code: body.code,
                message,
                more_info: body.more_info,
            };
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!(error = %err, "Twilio API rate limit hit");
            } else {
                debug!(error = %err, "Twilio API returned an error");
            }
            return Err(TwilioError::Api(err));
        }

        Ok(response.json().await?)
    }
}

/// SIDs are interpolated into URL paths, so only ASCII alphanumerics pass.
pub(crate) fn validate_sid(sid: &str, kind: &str) -> Result<(), TwilioError> {
    if sid.is_empty() {
        return Err(TwilioError::InvalidInput(format!(
            "{kind} SID must not be empty"
        )));
    }
    if !sid.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TwilioError::InvalidInput(format!(
            "{kind} SID '{sid}' must contain only letters and digits"
        )));
    }
    Ok(())
}
