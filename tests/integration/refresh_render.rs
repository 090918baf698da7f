//! Integration tests for fetching and rendering the message log.
//!
//! Drives `MessageSync::refresh` against the in-process mock server and
//! checks what ends up in the shared view.

mod support;

use std::sync::atomic::Ordering;

use securechat::api::http::HttpChatApi;
use securechat::crypto::MessageCipher;
use securechat::crypto::fernet::FernetCipher;
use securechat::session::SessionContext;
use securechat::sync::{MessageSync, SyncError};
use securechat::view::DECRYPTION_FAILED_TEXT;
use securechat_proto::message::Message;
use support::MockServer;

const TEST_KDF_ITERATIONS: u32 = 1_000;

fn session_with_key(key: &str) -> SessionContext {
    SessionContext::new(Some("alice".to_string()), Some(key.to_string()), true)
}

fn keyed_sync(server: &MockServer, key: &str) -> MessageSync<HttpChatApi, FernetCipher> {
    let session = session_with_key(key);
    let cipher = session.cipher(TEST_KDF_ITERATIONS);
    MessageSync::new(server.api(), session, cipher)
}

fn keyless_sync(server: &MockServer) -> MessageSync<HttpChatApi, FernetCipher> {
    MessageSync::new(server.api(), SessionContext::default(), None)
}

#[tokio::test]
async fn single_plain_message_renders_label_and_text() {
    let server = MockServer::start().await;
    server
        .state
        .set_messages(vec![Message::plain("a", "hi", "t1")]);

    let sync = keyless_sync(&server);
    assert_eq!(sync.refresh().await.unwrap(), 1);

    let view = sync.view();
    let view = view.lock();
    let items = view.messages.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "a (t1)");
    assert_eq!(items[0].text, "hi");
    assert_eq!(items[0].slot, 1);
    assert!(!items[0].decryption_failed);
}

#[tokio::test]
async fn slots_cycle_with_position() {
    let server = MockServer::start().await;
    server.state.set_messages(
        (0..5)
            .map(|i| Message::plain("u", format!("m{i}"), format!("t{i}")))
            .collect(),
    );

    let sync = keyless_sync(&server);
    sync.refresh().await.unwrap();

    let slots: Vec<usize> = sync
        .view()
        .lock()
        .messages
        .items()
        .iter()
        .map(|m| m.slot)
        .collect();
    assert_eq!(slots, vec![1, 2, 3, 1, 2]);
}

#[tokio::test]
async fn encrypted_message_is_decrypted_with_session_key() {
    let server = MockServer::start().await;
    let cipher = FernetCipher::from_password("pw", TEST_KDF_ITERATIONS);
    let token = cipher.encrypt("secret hello").unwrap();
    server
        .state
        .set_messages(vec![Message::encrypted("bob", token, "t1")]);

    let sync = keyed_sync(&server, "pw");
    sync.refresh().await.unwrap();

    let view = sync.view();
    let view = view.lock();
    assert_eq!(view.messages.items()[0].text, "secret hello");
    assert!(!view.messages.items()[0].decryption_failed);
}

#[tokio::test]
async fn wrong_key_shows_placeholder_for_that_message_only() {
    let server = MockServer::start().await;
    let other = FernetCipher::from_password("someone-else", TEST_KDF_ITERATIONS);
    server.state.set_messages(vec![
        Message::plain("a", "before", "t1"),
        Message::encrypted("b", other.encrypt("hidden").unwrap(), "t2"),
        Message::plain("c", "after", "t3"),
    ]);

    let sync = keyed_sync(&server, "pw");
    assert_eq!(sync.refresh().await.unwrap(), 3);

    let view = sync.view();
    let view = view.lock();
    let items = view.messages.items();
    assert_eq!(items[0].text, "before");
    assert_eq!(items[1].text, DECRYPTION_FAILED_TEXT);
    assert!(items[1].decryption_failed);
    assert_eq!(items[2].text, "after");
}

#[tokio::test]
async fn encrypted_message_without_key_shows_stored_text() {
    let server = MockServer::start().await;
    server
        .state
        .set_messages(vec![Message::encrypted("b", "gAAAAAB-token", "t1")]);

    let sync = keyless_sync(&server);
    sync.refresh().await.unwrap();

    assert_eq!(sync.view().lock().messages.items()[0].text, "gAAAAAB-token");
}

#[tokio::test]
async fn refresh_replaces_rather_than_appends() {
    let server = MockServer::start().await;
    server.state.set_messages(vec![
        Message::plain("a", "one", "t1"),
        Message::plain("a", "two", "t2"),
    ]);

    let sync = keyless_sync(&server);
    sync.refresh().await.unwrap();
    assert_eq!(sync.view().lock().messages.len(), 2);

    server
        .state
        .set_messages(vec![Message::plain("z", "only", "t9")]);
    sync.refresh().await.unwrap();

    let view = sync.view();
    let view = view.lock();
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages.items()[0].label, "z (t9)");
    assert_eq!(view.messages.refresh_count(), 2);
}

#[tokio::test]
async fn empty_log_renders_empty_view() {
    let server = MockServer::start().await;
    let sync = keyless_sync(&server);
    assert_eq!(sync.refresh().await.unwrap(), 0);
    assert!(sync.view().lock().messages.is_empty());
}

#[tokio::test]
async fn refresh_scrolls_to_newest() {
    let server = MockServer::start().await;
    server.state.set_messages(
        (0..8)
            .map(|i| Message::plain("u", "x", format!("t{i}")))
            .collect(),
    );

    let sync = keyless_sync(&server);
    sync.refresh().await.unwrap();
    assert_eq!(sync.view().lock().messages.scroll(), 7);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_view() {
    let server = MockServer::start().await;
    server
        .state
        .set_messages(vec![Message::plain("a", "kept", "t1")]);

    let sync = keyless_sync(&server);
    sync.refresh().await.unwrap();

    server.state.fail_fetches.store(true, Ordering::SeqCst);
    let result = sync.refresh().await;
    assert!(matches!(result, Err(SyncError::Api(_))));

    let view = sync.view();
    let view = view.lock();
    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages.items()[0].text, "kept");
    assert_eq!(view.messages.refresh_count(), 1);
}

#[tokio::test]
async fn unreachable_server_is_an_error_not_a_panic() {
    let server = MockServer::start().await;
    let base = server.base_url();
    drop(server);
    tokio::task::yield_now().await;

    let api = HttpChatApi::new(base, std::time::Duration::from_millis(500)).unwrap();
    let sync = MessageSync::<_, FernetCipher>::new(api, SessionContext::default(), None);
    assert!(sync.refresh().await.is_err());
    assert!(sync.view().lock().messages.is_empty());
}
