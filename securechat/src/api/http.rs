//! `reqwest`-backed implementation of [`ChatApi`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use securechat_proto::codec;
use securechat_proto::message::{GET_MESSAGES_PATH, Message, SUBMIT_MESSAGE_PATH, SubmitAck, SubmitMessage};
use securechat_proto::switch::SwitchUpdate;
use url::Url;

use super::{ApiError, ChatApi};

/// HTTP client for a `SecureChat` server.
///
/// Endpoint paths are absolute, so they resolve against the origin of
/// `base_url` the same way the browser pages resolve them against the
/// page origin.
#[derive(Clone)]
pub struct HttpChatApi {
    http: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpChatApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatApi")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpChatApi {
    /// Create a client for the server at `base_url`.
    ///
    /// `timeout` bounds each request end to end.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// The server base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    async fn post_json(
        &self,
        path: &'static str,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, ApiError> {
        let response = self
            .http
            .post(self.endpoint(path)?)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        check_status(path, response)
    }
}

fn check_status(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            endpoint,
            status: status.as_u16(),
        })
    }
}

impl ChatApi for HttpChatApi {
    async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError> {
        let response = self
            .http
            .get(self.endpoint(GET_MESSAGES_PATH)?)
            .send()
            .await?;
        let body = check_status(GET_MESSAGES_PATH, response)?.bytes().await?;
        Ok(codec::decode_messages(&body)?)
    }

    async fn submit_message(&self, submission: &SubmitMessage) -> Result<SubmitAck, ApiError> {
        let body = codec::encode(submission)?;
        let response = self.post_json(SUBMIT_MESSAGE_PATH, body).await?;
        let bytes = response.bytes().await?;
        Ok(codec::decode_ack(&bytes)?)
    }

    async fn update_switch(&self, update: SwitchUpdate) -> Result<(), ApiError> {
        let body = codec::encode(&update)?;
        self.post_json(update.path(), body).await?;
        Ok(())
    }
}
