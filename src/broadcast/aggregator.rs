use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::broadcast::content::MediaItem;

/// how long to wait after the last item of a media group before treating the
/// group as complete; the platform sends grouped uploads as a burst of
/// separate messages with no terminating signal
pub const DEFAULT_GROUP_DEBOUNCE: Duration = Duration::from_millis(1500);

/// a completed media group, delivered to the mailing session machinery
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedGroup {
    pub admin_id: i64,
    pub items: Vec<MediaItem>,
}

struct AggregationWindow {
    group_id: String,
    items: Vec<MediaItem>,
    // bumped on every observation; the timer captures the value it was armed
    // with and fires only if it still matches
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

/// coalesces bursts of media uploads sharing one group id into a single
/// ordered batch per admin
pub struct MediaGroupAggregator {
    windows: Arc<Mutex<HashMap<i64, AggregationWindow>>>,
    tx: mpsc::UnboundedSender<FinalizedGroup>,
    debounce: Duration,
}

impl MediaGroupAggregator {
    pub fn new(debounce: Duration) -> (Self, mpsc::UnboundedReceiver<FinalizedGroup>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                windows: Arc::new(Mutex::new(HashMap::new())),
                tx,
                debounce,
            },
            rx,
        )
    }

    /// records one media item of a group and (re)arms the debounce timer;
    /// a different group id from the same admin replaces the previous window
    pub async fn observe(&self, admin_id: i64, group_id: &str, item: MediaItem) {
        let mut windows = self.windows.lock().await;

        let replace = match windows.get(&admin_id) {
            Some(window) => window.group_id != group_id,
            None => true,
        };
        if replace {
            if let Some(mut stale) = windows.remove(&admin_id) {
                debug!(
                    "Admin {}: media group {} superseded by {}",
                    admin_id, stale.group_id, group_id
                );
                if let Some(timer) = stale.timer.take() {
                    timer.abort();
                }
            }
            windows.insert(
                admin_id,
                AggregationWindow {
                    group_id: group_id.to_string(),
                    items: Vec::new(),
                    epoch: 0,
                    timer: None,
                },
            );
        }

        let window = match windows.get_mut(&admin_id) {
            Some(window) => window,
            None => return,
        };
        window.items.push(item);
        window.epoch += 1;
        if let Some(timer) = window.timer.take() {
            timer.abort();
        }

        // abort above is best-effort only; the (group_id, epoch) comparison at
        // fire time is what actually guards against a stale timer
        let armed_epoch = window.epoch;
        let armed_group = window.group_id.clone();
        let shared = Arc::clone(&self.windows);
        let tx = self.tx.clone();
        let debounce = self.debounce;
        window.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let mut windows = shared.lock().await;
            let current = match windows.get(&admin_id) {
                Some(window) => window.group_id == armed_group && window.epoch == armed_epoch,
                None => false,
            };
            if !current {
                return;
            }
            if let Some(window) = windows.remove(&admin_id) {
                if window.items.is_empty() {
                    return;
                }
                info!(
                    "Admin {}: media group {} finalized with {} items",
                    admin_id,
                    window.group_id,
                    window.items.len()
                );
                let _ = tx.send(FinalizedGroup {
                    admin_id,
                    items: window.items,
                });
            }
        }));
    }

    /// drops any pending window for the admin (session cancel path);
    /// returns whether a window was pending
    pub async fn discard(&self, admin_id: i64) -> bool {
        let mut windows = self.windows.lock().await;
        match windows.remove(&admin_id) {
            Some(mut window) => {
                if let Some(timer) = window.timer.take() {
                    timer.abort();
                }
                debug!("Admin {}: pending media group {} discarded", admin_id, window.group_id);
                true
            }
            None => false,
        }
    }

    pub async fn has_window(&self, admin_id: i64) -> bool {
        self.windows.lock().await.contains_key(&admin_id)
    }
}
