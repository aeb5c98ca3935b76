use std::sync::Arc;
use url::Url;

use gift_shop_bot::broadcast::content::{ButtonKind, MediaItem, MediaKind, PostButton, PostContent};
use gift_shop_bot::broadcast::BroadcastDispatcher;

use super::mocks::{InMemoryRecipientStore, MockTransport, SendShape};

fn text_post(body: &str) -> PostContent {
    PostContent::Text {
        body: body.to_string(),
    }
}

fn link_button(label: &str) -> PostButton {
    PostButton {
        kind: ButtonKind::Link,
        label: label.to_string(),
        target: Url::parse("https://example.com/sale").expect("valid url"),
    }
}

fn album() -> Vec<MediaItem> {
    vec![
        MediaItem::new(MediaKind::Photo, "photo-1", None),
        MediaItem::new(MediaKind::Photo, "photo-2", None),
        MediaItem::new(MediaKind::Photo, "photo-3", Some("Sale!".to_string())),
    ]
}

#[tokio::test]
async fn test_text_broadcast_counts_unreachable_recipient() {
    let transport = Arc::new(MockTransport::new().unreachable(3));
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![1, 2, 3]));
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let report = dispatcher
        .dispatch(&text_post("Hello"), None)
        .await
        .expect("dispatch failed");

    assert_eq!(report.total_recipients, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.blocked_or_unreachable, 1);
    assert_eq!(report.succeeded + report.failed, report.total_recipients);
    assert!((report.success_rate() - 2.0 / 3.0).abs() < 1e-9);

    // exactly one attempt per recipient, including the unreachable one
    for recipient in [1, 2, 3] {
        let sends = transport.recorded_for(recipient);
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].shape, SendShape::Text);
        assert_eq!(sends[0].text.as_deref(), Some("Hello"));
    }
}

#[tokio::test]
async fn test_empty_recipient_list_yields_zero_report() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(InMemoryRecipientStore::with_recipients(Vec::new()));
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let report = dispatcher
        .dispatch(&text_post("Hello"), None)
        .await
        .expect("dispatch failed");

    assert_eq!(report.total_recipients, 0);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.blocked_or_unreachable, 0);
    // no recipients must not mean a division fault
    assert_eq!(report.success_rate(), 0.0);
    assert!(transport.recorded().is_empty());
}

#[tokio::test]
async fn test_generic_failures_are_not_counted_as_unreachable() {
    let transport = Arc::new(MockTransport::new().failing(2).unreachable(3));
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![1, 2, 3]));
    let dispatcher = BroadcastDispatcher::new(transport, store);

    let report = dispatcher
        .dispatch(&text_post("Hello"), None)
        .await
        .expect("dispatch failed");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(report.blocked_or_unreachable, 1);
    assert!(report.blocked_or_unreachable <= report.failed);
}

#[tokio::test]
async fn test_one_failure_does_not_abort_the_run() {
    let transport = Arc::new(MockTransport::new().unreachable(1));
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![1, 2, 3, 4]));
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let report = dispatcher
        .dispatch(&text_post("Hello"), None)
        .await
        .expect("dispatch failed");

    // the first recipient fails, the rest are still attempted
    assert_eq!(report.succeeded, 3);
    assert_eq!(transport.recorded().len(), 4);
}

#[tokio::test]
async fn test_media_group_sends_album_then_button_message() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![7]));
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let content = PostContent::MediaGroup { items: album() };
    let report = dispatcher
        .dispatch(&content, Some(&link_button("Open sale")))
        .await
        .expect("dispatch failed");

    assert_eq!(report.succeeded, 1);

    let sends = transport.recorded_for(7);
    assert_eq!(sends.len(), 2);
    // the album goes first, preserving item order
    assert_eq!(sends[0].shape, SendShape::MediaGroup);
    let file_ids: Vec<&str> = sends[0].items.iter().map(|i| i.file_id.as_str()).collect();
    assert_eq!(file_ids, vec!["photo-1", "photo-2", "photo-3"]);
    assert!(!sends[0].with_button);
    // the button rides on a separate trailing message
    assert_eq!(sends[1].shape, SendShape::Text);
    assert!(sends[1].with_button);
}

#[tokio::test]
async fn test_media_group_without_button_sends_album_only() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![7]));
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let content = PostContent::MediaGroup { items: album() };
    dispatcher.dispatch(&content, None).await.expect("dispatch failed");

    let sends = transport.recorded_for(7);
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].shape, SendShape::MediaGroup);
}

#[tokio::test]
async fn test_trailing_button_message_attempted_even_when_album_fails() {
    let transport = Arc::new(MockTransport::new().unreachable(5));
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![5]));
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let content = PostContent::MediaGroup { items: album() };
    let report = dispatcher
        .dispatch(&content, Some(&link_button("Open sale")))
        .await
        .expect("dispatch failed");

    // the recipient counts once, against the album send
    assert_eq!(report.total_recipients, 1);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.blocked_or_unreachable, 1);

    // both the album and the trailing button message were attempted
    let sends = transport.recorded_for(5);
    assert_eq!(sends.len(), 2);
    assert_eq!(sends[0].shape, SendShape::MediaGroup);
    assert_eq!(sends[1].shape, SendShape::Text);
}

#[tokio::test]
async fn test_single_photo_keeps_caption_and_button() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![1, 2]));
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let content = PostContent::Photo {
        file_id: "photo-9".to_string(),
        caption: Some("New arrivals".to_string()),
    };
    let report = dispatcher
        .dispatch(&content, Some(&link_button("Shop")))
        .await
        .expect("dispatch failed");

    assert_eq!(report.succeeded, 2);
    for recipient in [1, 2] {
        let sends = transport.recorded_for(recipient);
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].shape, SendShape::Media);
        assert_eq!(sends[0].items[0].file_id, "photo-9");
        assert_eq!(sends[0].text.as_deref(), Some("New arrivals"));
        assert!(sends[0].with_button);
    }
}

#[tokio::test]
async fn test_recipient_list_is_snapshotted_once() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(InMemoryRecipientStore::with_recipients(vec![1, 2, 3]));
    let dispatcher = BroadcastDispatcher::new(transport, store.clone());

    dispatcher
        .dispatch(&text_post("Hello"), None)
        .await
        .expect("dispatch failed");

    assert_eq!(*store.list_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_store_unavailability_aborts_without_sends() {
    let transport = Arc::new(MockTransport::new());
    let store = Arc::new(InMemoryRecipientStore::unavailable());
    let dispatcher = BroadcastDispatcher::new(transport.clone(), store);

    let result = dispatcher.dispatch(&text_post("Hello"), None).await;

    assert!(result.is_err());
    assert!(transport.recorded().is_empty());
}
