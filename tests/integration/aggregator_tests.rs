use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;

use gift_shop_bot::broadcast::content::{MediaItem, MediaKind};
use gift_shop_bot::broadcast::{MediaGroupAggregator, DEFAULT_GROUP_DEBOUNCE};

const ADMIN: i64 = 42;

fn photo(file_id: &str, caption: Option<&str>) -> MediaItem {
    MediaItem::new(MediaKind::Photo, file_id, caption.map(|c| c.to_string()))
}

/// lets spawned timer tasks run after the paused clock was advanced
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_finalizes_as_one_group_in_arrival_order() {
    let (aggregator, mut rx) = MediaGroupAggregator::new(DEFAULT_GROUP_DEBOUNCE);

    aggregator.observe(ADMIN, "g1", photo("p1", None)).await;
    aggregator.observe(ADMIN, "g1", photo("p2", None)).await;
    aggregator
        .observe(ADMIN, "g1", photo("p3", Some("Sale!")))
        .await;

    tokio::time::advance(Duration::from_millis(1600)).await;
    settle().await;

    let group = rx.try_recv().expect("group was not finalized");
    assert_eq!(group.admin_id, ADMIN);
    let file_ids: Vec<&str> = group.items.iter().map(|i| i.file_id.as_str()).collect();
    assert_eq!(file_ids, vec!["p1", "p2", "p3"]);

    // exactly one finalization for the whole burst
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(!aggregator.has_window(ADMIN).await);
}

#[tokio::test(start_paused = true)]
async fn test_each_item_rearms_the_debounce_timer() {
    let (aggregator, mut rx) = MediaGroupAggregator::new(DEFAULT_GROUP_DEBOUNCE);

    aggregator.observe(ADMIN, "g1", photo("p1", None)).await;
    tokio::time::advance(Duration::from_millis(1000)).await;
    settle().await;

    // the second item arrives inside the window and restarts the timer
    aggregator.observe(ADMIN, "g1", photo("p2", None)).await;
    tokio::time::advance(Duration::from_millis(1000)).await;
    settle().await;

    // two seconds after the first item, but only one after the second:
    // not finalized yet
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    tokio::time::advance(Duration::from_millis(600)).await;
    settle().await;

    let group = rx.try_recv().expect("group was not finalized");
    assert_eq!(group.items.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_new_group_supersedes_a_pending_window() {
    let (aggregator, mut rx) = MediaGroupAggregator::new(DEFAULT_GROUP_DEBOUNCE);

    aggregator.observe(ADMIN, "g1", photo("old-1", None)).await;
    aggregator.observe(ADMIN, "g1", photo("old-2", None)).await;
    // a different group id from the same admin replaces the window
    aggregator.observe(ADMIN, "g2", photo("new-1", None)).await;

    tokio::time::advance(Duration::from_millis(1600)).await;
    settle().await;

    let group = rx.try_recv().expect("group was not finalized");
    let file_ids: Vec<&str> = group.items.iter().map(|i| i.file_id.as_str()).collect();
    assert_eq!(file_ids, vec!["new-1"]);

    // the superseded window never fires
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_discard_prevents_finalization() {
    let (aggregator, mut rx) = MediaGroupAggregator::new(DEFAULT_GROUP_DEBOUNCE);

    aggregator.observe(ADMIN, "g1", photo("p1", None)).await;
    assert!(aggregator.has_window(ADMIN).await);
    assert!(aggregator.discard(ADMIN).await);
    assert!(!aggregator.has_window(ADMIN).await);

    tokio::time::advance(Duration::from_millis(2000)).await;
    settle().await;

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    // nothing left to discard
    assert!(!aggregator.discard(ADMIN).await);
}

#[tokio::test(start_paused = true)]
async fn test_windows_are_independent_across_admins() {
    let (aggregator, mut rx) = MediaGroupAggregator::new(DEFAULT_GROUP_DEBOUNCE);
    let other: i64 = 43;

    aggregator.observe(ADMIN, "g1", photo("a1", None)).await;
    aggregator.observe(other, "g2", photo("b1", None)).await;
    aggregator.observe(other, "g2", photo("b2", None)).await;

    tokio::time::advance(Duration::from_millis(1600)).await;
    settle().await;

    let mut groups = Vec::new();
    groups.push(rx.try_recv().expect("first group missing"));
    groups.push(rx.try_recv().expect("second group missing"));
    groups.sort_by_key(|g| g.admin_id);

    assert_eq!(groups[0].admin_id, ADMIN);
    assert_eq!(groups[0].items.len(), 1);
    assert_eq!(groups[1].admin_id, other);
    assert_eq!(groups[1].items.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_debounce_duration_is_honored() {
    let (aggregator, mut rx) = MediaGroupAggregator::new(Duration::from_millis(300));

    aggregator.observe(ADMIN, "g1", photo("p1", None)).await;
    tokio::time::advance(Duration::from_millis(200)).await;
    settle().await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    tokio::time::advance(Duration::from_millis(200)).await;
    settle().await;
    assert!(rx.try_recv().is_ok());
}
