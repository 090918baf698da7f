//! Message synchronization loop.
//!
//! [`MessageSync`] owns the client side of the chat log: it fetches the
//! server's messages and rebuilds the shared [`ChatView`](crate::view::ChatView)
//! from them ([`refresh`](MessageSync::refresh)), and it submits composed
//! messages ([`send`](MessageSync::send)). Periodic refreshing lives in
//! [`poll`].
//!
//! # Error policy
//!
//! Failures never escalate. Every failed refresh or send is logged here, at
//! the point it happens, and the view is left as it was. The `Result`s
//! returned to callers are informational; the poller discards them.

pub mod poll;

use std::sync::Arc;

use securechat_proto::message::SubmitMessage;

use crate::api::{ApiError, ChatApi};
use crate::crypto::{CryptoError, MessageCipher};
use crate::session::SessionContext;
use crate::view::{self, SharedView};

/// Errors from a single refresh or send.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The server could not be reached or answered badly.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// The outgoing message could not be encrypted.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The server answered but did not acknowledge the message.
    #[error("server did not acknowledge the message")]
    Rejected,
}

/// Keeps a [`SharedView`] in sync with the server's message log.
///
/// Generic over the API client and the cipher so tests can substitute
/// either. The cipher should be the one derived from the session key
/// (see [`SessionContext::cipher`]); `None` means the session has no key.
pub struct MessageSync<A: ChatApi, C: MessageCipher> {
    api: A,
    session: SessionContext,
    cipher: Option<C>,
    view: SharedView,
}

impl<A: ChatApi, C: MessageCipher> MessageSync<A, C> {
    /// Create a sync component with a fresh, empty view.
    pub fn new(api: A, session: SessionContext, cipher: Option<C>) -> Self {
        Self::with_view(api, session, cipher, view::shared_view())
    }

    /// Create a sync component writing into an existing view.
    pub const fn with_view(
        api: A,
        session: SessionContext,
        cipher: Option<C>,
        view: SharedView,
    ) -> Self {
        Self {
            api,
            session,
            cipher,
            view,
        }
    }

    /// Handle to the view this component writes to.
    #[must_use]
    pub fn view(&self) -> SharedView {
        Arc::clone(&self.view)
    }

    /// The session this component was built with.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// The API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    fn cipher(&self) -> Option<&dyn MessageCipher> {
        self.cipher.as_ref().map(|c| c as &dyn MessageCipher)
    }

    /// Fetch the message log and replace the rendered list with it.
    ///
    /// Encrypted bodies are decrypted with the session cipher; a body that
    /// fails to decrypt is shown as a placeholder without affecting the
    /// rest. On success the view is scrolled to the newest message and the
    /// number of rendered messages is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Api`] if the fetch fails. The failure is logged
    /// and the view keeps its previous contents.
    pub async fn refresh(&self) -> Result<usize, SyncError> {
        let messages = match self.api.fetch_messages().await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh messages");
                return Err(e.into());
            }
        };

        let rendered = view::render_messages(&messages, self.cipher());
        let count = rendered.len();
        self.view.lock().messages.replace(rendered);

        tracing::debug!(count, "message view refreshed");
        Ok(count)
    }

    /// Submit `text` as a new message.
    ///
    /// The text is encrypted first when the session has encryption enabled
    /// and a key. There is no client-side validation: an empty string is
    /// submitted like any other. On a success acknowledgement the compose
    /// input is cleared and a refresh runs.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if encryption fails, the request fails, or the
    /// server does not acknowledge. Each case is logged; the input is left
    /// untouched and nothing is retried.
    pub async fn send(&self, text: &str) -> Result<(), SyncError> {
        let submission = self
            .build_submission(text)
            .inspect_err(|e| tracing::warn!(error = %e, "failed to encrypt outgoing message"))?;

        let ack = match self.api.submit_message(&submission).await {
            Ok(ack) => ack,
            Err(e) => {
                tracing::warn!(error = %e, "failed to send message");
                return Err(e.into());
            }
        };

        if !ack.success {
            tracing::warn!("server did not acknowledge message");
            return Err(SyncError::Rejected);
        }

        tracing::info!(
            encrypted = submission.message_encrypted,
            "message sent successfully"
        );
        self.view.lock().input.clear();

        // The send succeeded even if this refresh fails; refresh logs it.
        let _ = self.refresh().await;
        Ok(())
    }

    /// Submit the current contents of the compose input.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_input(&self) -> Result<(), SyncError> {
        let text = self.view.lock().input.clone();
        self.send(&text).await
    }

    fn build_submission(&self, text: &str) -> Result<SubmitMessage, SyncError> {
        let (message_content, message_encrypted) = match self.cipher() {
            Some(cipher) if self.session.encryption_enabled() => (cipher.encrypt(text)?, true),
            _ => (text.to_string(), false),
        };

        Ok(SubmitMessage {
            user_id: self.session.username().map(str::to_string),
            message_content,
            message_encrypted,
        })
    }
}
