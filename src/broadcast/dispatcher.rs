use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use teloxide::types::ChatId;

use crate::broadcast::content::{PostButton, PostContent};
use crate::recipient_store::{RecipientStore, StoreError};
use crate::transport::{SendError, Transport};

// a grouped-media send cannot carry an inline keyboard, so the button rides on
// a short trailing message pointing back at the album
const GROUP_BUTTON_POINTER: &str = "👆";

/// outcome summary of one broadcast run; reported to the admin and discarded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryReport {
    pub total_recipients: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub blocked_or_unreachable: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl DeliveryReport {
    pub fn success_rate(&self) -> f64 {
        if self.total_recipients == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total_recipients as f64
        }
    }
}

/// sends one finalized post to every known recipient and accounts for the
/// outcomes; no retries, one attempt per recipient
pub struct BroadcastDispatcher {
    transport: Arc<dyn Transport>,
    store: Arc<dyn RecipientStore>,
}

impl BroadcastDispatcher {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn RecipientStore>) -> Self {
        Self { transport, store }
    }

    /// runs the full fan-out; may take seconds to minutes, so callers run it
    /// on a dedicated task. the recipient list is a snapshot taken once at
    /// the start, users joining mid-run are not included
    pub async fn dispatch(
        &self,
        content: &PostContent,
        button: Option<&PostButton>,
    ) -> Result<DeliveryReport, StoreError> {
        let recipients = self.store.list_recipients().await?;
        let started = Instant::now();
        info!(
            "Broadcast started: {} to {} recipients{}",
            content.kind_name(),
            recipients.len(),
            if button.is_some() { ", with button" } else { "" }
        );

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut blocked_or_unreachable = 0usize;

        for user_id in &recipients {
            let recipient = ChatId(*user_id);
            let result = self.send_to(recipient, content, button).await;
            match result {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    failed += 1;
                    if e.is_recipient_unreachable() {
                        blocked_or_unreachable += 1;
                        info!("Broadcast: recipient {} unreachable: {}", user_id, e);
                    } else {
                        warn!("Broadcast: send to {} failed: {}", user_id, e);
                    }
                }
            }
        }

        let report = DeliveryReport {
            total_recipients: recipients.len(),
            succeeded,
            failed,
            blocked_or_unreachable,
            elapsed: started.elapsed(),
        };
        info!(
            "Broadcast finished in {:.1}s: {}/{} delivered, {} failed ({} blocked/unreachable)",
            report.elapsed.as_secs_f64(),
            report.succeeded,
            report.total_recipients,
            report.failed,
            report.blocked_or_unreachable
        );
        Ok(report)
    }

    /// exactly one shaped send per recipient; the primary send alone decides
    /// the recipient's outcome
    async fn send_to(
        &self,
        recipient: ChatId,
        content: &PostContent,
        button: Option<&PostButton>,
    ) -> Result<(), SendError> {
        match content {
            PostContent::Text { body } => {
                self.transport.send_text(recipient, body, button).await?;
            }
            PostContent::MediaGroup { items } => {
                let sent = self.transport.send_media_group(recipient, items).await;
                // the trailing button message is attempted even when the album
                // send failed, matching the long-standing behavior of the bot
                if let Some(button) = button {
                    if let Err(e) = self
                        .transport
                        .send_text(recipient, GROUP_BUTTON_POINTER, Some(button))
                        .await
                    {
                        warn!(
                            "Broadcast: button message to {} failed: {}",
                            recipient.0, e
                        );
                    }
                }
                sent?;
            }
            _ => {
                // single photo/video/document
                if let Some(item) = content.single_item() {
                    self.transport.send_media(recipient, &item, button).await?;
                }
            }
        }
        Ok(())
    }
}
