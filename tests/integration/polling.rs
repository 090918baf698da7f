//! Integration tests for periodic refreshing.

mod support;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use securechat::crypto::fernet::FernetCipher;
use securechat::session::SessionContext;
use securechat::sync::MessageSync;
use securechat::sync::poll::spawn_polling;
use securechat_proto::message::Message;
use support::{MockServer, wait_until};

const PERIOD: Duration = Duration::from_millis(50);

#[tokio::test]
async fn first_refresh_is_immediate() {
    let server = MockServer::start().await;
    server
        .state
        .set_messages(vec![Message::plain("a", "hi", "t1")]);
    let sync = Arc::new(MessageSync::<_, FernetCipher>::new(
        server.api(),
        SessionContext::default(),
        None,
    ));

    // Period far longer than the wait: only the initial tick can fire.
    let handle = spawn_polling(Arc::clone(&sync), Duration::from_secs(60));
    let view = sync.view();
    assert!(wait_until(Duration::from_secs(2), || view.lock().messages.len() == 1).await);
    handle.shutdown().await;

    assert_eq!(server.state.fetch_count(), 1);
}

#[tokio::test]
async fn new_server_messages_appear_without_user_action() {
    let server = MockServer::start().await;
    let sync = Arc::new(MessageSync::<_, FernetCipher>::new(
        server.api(),
        SessionContext::default(),
        None,
    ));
    let handle = spawn_polling(Arc::clone(&sync), PERIOD);
    let view = sync.view();

    assert!(wait_until(Duration::from_secs(2), || server.state.fetch_count() >= 1).await);
    server.state.set_messages(vec![
        Message::plain("a", "one", "t1"),
        Message::plain("b", "two", "t2"),
    ]);

    assert!(wait_until(Duration::from_secs(2), || view.lock().messages.len() == 2).await);
    handle.shutdown().await;
}

#[tokio::test]
async fn polling_survives_server_errors() {
    let server = MockServer::start().await;
    server
        .state
        .set_messages(vec![Message::plain("a", "kept", "t1")]);
    let sync = Arc::new(MessageSync::<_, FernetCipher>::new(
        server.api(),
        SessionContext::default(),
        None,
    ));
    let handle = spawn_polling(Arc::clone(&sync), PERIOD);
    let view = sync.view();
    assert!(wait_until(Duration::from_secs(2), || view.lock().messages.len() == 1).await);

    server.state.fail_fetches.store(true, Ordering::SeqCst);
    let failing_from = server.state.fetch_count();
    assert!(
        wait_until(Duration::from_secs(2), || {
            server.state.fetch_count() >= failing_from + 3
        })
        .await
    );
    assert_eq!(view.lock().messages.items()[0].text, "kept");

    server.state.fail_fetches.store(false, Ordering::SeqCst);
    server
        .state
        .set_messages(vec![Message::plain("a", "recovered", "t2")]);
    assert!(
        wait_until(Duration::from_secs(2), || {
            view.lock()
                .messages
                .items()
                .first()
                .is_some_and(|m| m.text == "recovered")
        })
        .await
    );
    handle.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_fetching() {
    let server = MockServer::start().await;
    let sync = Arc::new(MessageSync::<_, FernetCipher>::new(
        server.api(),
        SessionContext::default(),
        None,
    ));
    let handle = spawn_polling(Arc::clone(&sync), PERIOD);
    assert!(wait_until(Duration::from_secs(2), || server.state.fetch_count() >= 2).await);

    handle.shutdown().await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let stopped_at = server.state.fetch_count();
    tokio::time::sleep(PERIOD * 4).await;
    assert_eq!(server.state.fetch_count(), stopped_at);
}
