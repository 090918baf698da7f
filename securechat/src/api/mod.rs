//! Client side of the `SecureChat` HTTP API.
//!
//! Defines the [`ChatApi`] trait that the sync loop and front end talk to.
//! Concrete implementations:
//! - [`http::HttpChatApi`]: `reqwest` client against a real server

pub mod http;

use securechat_proto::codec::CodecError;
use securechat_proto::message::{Message, SubmitAck, SubmitMessage};
use securechat_proto::switch::SwitchUpdate;

/// Errors that can occur while talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the response not read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Endpoint path that was requested.
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Codec(#[from] CodecError),

    /// An endpoint URL could not be built from the base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Async access to the four `SecureChat` endpoints.
///
/// Implementations perform exactly one request per call: no retries, no
/// caching. Callers decide what to do with failures.
pub trait ChatApi: Send + Sync {
    /// `GET /get_messages`: the server's current message log, in order.
    fn fetch_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, ApiError>> + Send;

    /// `POST /submit_message`: store a message and return the server's ack.
    fn submit_message(
        &self,
        submission: &SubmitMessage,
    ) -> impl std::future::Future<Output = Result<SubmitAck, ApiError>> + Send;

    /// `POST /update_ssh` or `POST /update_encryption`, depending on `update`.
    fn update_switch(
        &self,
        update: SwitchUpdate,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}

/// Send a switch update, logging the outcome instead of returning it.
///
/// Switch toggles are fire-and-forget: a failure is logged and the caller
/// carries on.
pub async fn toggle_switch<A: ChatApi>(api: &A, update: SwitchUpdate) {
    match api.update_switch(update).await {
        Ok(()) => tracing::info!(
            switch = %update.switch(),
            enabled = update.enabled(),
            "feature switch updated"
        ),
        Err(e) => tracing::warn!(
            switch = %update.switch(),
            enabled = update.enabled(),
            error = %e,
            "failed to update feature switch"
        ),
    }
}
