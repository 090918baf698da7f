//! The rendered message list and compose input.
//!
//! A [`MessageView`] is never patched: every refresh builds a new list of
//! [`RenderedMessage`]s and swaps it in whole, then scrolls to the newest
//! entry. The [`ChatView`] pairs that list with the compose input so the
//! sync loop can clear the input after a successful send.

use std::sync::Arc;

use parking_lot::Mutex;
use securechat_proto::message::Message;

use crate::crypto::MessageCipher;

/// Text shown for a message whose body could not be decrypted.
pub const DECRYPTION_FAILED_TEXT: &str = "[Unable to decrypt message]";

/// Number of alternating display slots (colour classes) for messages.
pub const SLOT_COUNT: usize = 3;

/// One message as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Author and timestamp, e.g. `alice (2023-11-23 10:00:00)`.
    pub label: String,
    /// Body text: plaintext, decrypted plaintext, or the failure placeholder.
    pub text: String,
    /// Display slot in `1..=SLOT_COUNT`, cycling with list position.
    pub slot: usize,
    /// Set when `text` is [`DECRYPTION_FAILED_TEXT`] because decryption failed.
    pub decryption_failed: bool,
}

/// Render a single fetched message at list position `index`.
///
/// Encrypted bodies are decrypted when a cipher is available. Without a
/// cipher the stored text is shown as-is. A failed decryption yields the
/// placeholder for this message only.
#[must_use]
pub fn render_message(
    index: usize,
    message: &Message,
    cipher: Option<&dyn MessageCipher>,
) -> RenderedMessage {
    let (text, decryption_failed) = match cipher {
        Some(cipher) if message.encrypted => match cipher.decrypt(&message.message) {
            Ok(plaintext) => (plaintext, false),
            Err(e) => {
                tracing::debug!(
                    index,
                    user_id = %message.user_id,
                    error = %e,
                    "failed to decrypt message body"
                );
                (DECRYPTION_FAILED_TEXT.to_string(), true)
            }
        },
        _ => (message.message.clone(), false),
    };

    RenderedMessage {
        label: format!("{} ({})", message.user_id, message.timestamp),
        text,
        slot: index % SLOT_COUNT + 1,
        decryption_failed,
    }
}

/// Render a fetched message list, one item per message, in order.
#[must_use]
pub fn render_messages(
    messages: &[Message],
    cipher: Option<&dyn MessageCipher>,
) -> Vec<RenderedMessage> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| render_message(index, message, cipher))
        .collect()
}

/// The rendered message list with its scroll position.
#[derive(Debug, Default)]
pub struct MessageView {
    items: Vec<RenderedMessage>,
    scroll: usize,
    refreshes: u64,
}

impl MessageView {
    /// Discard the current list, install `items`, and scroll to the newest.
    pub fn replace(&mut self, items: Vec<RenderedMessage>) {
        self.items = items;
        self.refreshes += 1;
        self.scroll_to_bottom();
    }

    /// Rendered items in display order.
    #[must_use]
    pub fn items(&self) -> &[RenderedMessage] {
        &self.items
    }

    /// Number of rendered items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the item the view is scrolled to.
    #[must_use]
    pub const fn scroll(&self) -> usize {
        self.scroll
    }

    /// How many times the list has been replaced.
    #[must_use]
    pub const fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    /// Scroll to the newest item.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.items.len().saturating_sub(1);
    }

    /// Scroll towards older items.
    pub const fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scroll towards newer items, stopping at the newest.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.items.len().saturating_sub(1));
    }
}

/// Everything the chat screen shows that the sync loop writes to.
#[derive(Debug, Default)]
pub struct ChatView {
    /// The rendered message list.
    pub messages: MessageView,
    /// The compose input text.
    pub input: String,
}

/// Chat view shared between the sync loop and the front end.
pub type SharedView = Arc<Mutex<ChatView>>;

/// Create an empty shared chat view.
#[must_use]
pub fn shared_view() -> SharedView {
    Arc::new(Mutex::new(ChatView::default()))
}
