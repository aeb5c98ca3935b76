use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use teloxide::types::{ChatId, MessageId};

use gift_shop_bot::broadcast::content::{MediaItem, PostButton};
use gift_shop_bot::recipient_store::{RecipientStore, StoreError, UsageStatistics};
use gift_shop_bot::transport::{SendError, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendShape {
    Text,
    Media,
    MediaGroup,
}

/// one transport call as seen by the mock, recorded whether it succeeded or
/// not so tests can assert on attempts as well as deliveries
#[derive(Debug, Clone)]
pub struct RecordedSend {
    pub recipient: i64,
    pub shape: SendShape,
    pub text: Option<String>,
    pub items: Vec<MediaItem>,
    pub with_button: bool,
}

/// transport double that records every call and fails for configured
/// recipients
pub struct MockTransport {
    pub sends: Arc<Mutex<Vec<RecordedSend>>>,
    pub deleted: Arc<Mutex<Vec<(i64, i32)>>>,
    unreachable: HashSet<i64>,
    failing: HashSet<i64>,
    next_message_id: Arc<Mutex<i32>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sends: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            unreachable: HashSet::new(),
            failing: HashSet::new(),
            next_message_id: Arc::new(Mutex::new(0)),
        }
    }

    /// sends to this recipient fail as blocked/unreachable
    pub fn unreachable(mut self, recipient: i64) -> Self {
        self.unreachable.insert(recipient);
        self
    }

    /// sends to this recipient fail with a generic transport error
    pub fn failing(mut self, recipient: i64) -> Self {
        self.failing.insert(recipient);
        self
    }

    pub fn recorded(&self) -> Vec<RecordedSend> {
        self.sends.lock().unwrap().clone()
    }

    pub fn recorded_for(&self, recipient: i64) -> Vec<RecordedSend> {
        self.recorded()
            .into_iter()
            .filter(|send| send.recipient == recipient)
            .collect()
    }

    fn record(&self, send: RecordedSend) {
        self.sends.lock().unwrap().push(send);
    }

    fn outcome(&self, recipient: ChatId) -> Result<MessageId, SendError> {
        if self.unreachable.contains(&recipient.0) {
            return Err(SendError::RecipientUnreachable(
                "bot was blocked by the user".to_string(),
            ));
        }
        if self.failing.contains(&recipient.0) {
            return Err(SendError::Transport("internal server error".to_string()));
        }
        let mut next = self.next_message_id.lock().unwrap();
        *next += 1;
        Ok(MessageId(*next))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_text(
        &self,
        recipient: ChatId,
        text: &str,
        button: Option<&PostButton>,
    ) -> Result<MessageId, SendError> {
        self.record(RecordedSend {
            recipient: recipient.0,
            shape: SendShape::Text,
            text: Some(text.to_string()),
            items: Vec::new(),
            with_button: button.is_some(),
        });
        self.outcome(recipient)
    }

    async fn send_media(
        &self,
        recipient: ChatId,
        item: &MediaItem,
        button: Option<&PostButton>,
    ) -> Result<MessageId, SendError> {
        self.record(RecordedSend {
            recipient: recipient.0,
            shape: SendShape::Media,
            text: item.caption.clone(),
            items: vec![item.clone()],
            with_button: button.is_some(),
        });
        self.outcome(recipient)
    }

    async fn send_media_group(
        &self,
        recipient: ChatId,
        items: &[MediaItem],
    ) -> Result<Vec<MessageId>, SendError> {
        self.record(RecordedSend {
            recipient: recipient.0,
            shape: SendShape::MediaGroup,
            text: None,
            items: items.to_vec(),
            with_button: false,
        });
        let first = self.outcome(recipient)?;
        Ok(vec![first])
    }

    async fn edit_message_text(
        &self,
        recipient: ChatId,
        _message: MessageId,
        _text: &str,
    ) -> Result<(), SendError> {
        self.outcome(recipient).map(|_| ())
    }

    async fn delete_message(
        &self,
        recipient: ChatId,
        message: MessageId,
    ) -> Result<(), SendError> {
        self.deleted.lock().unwrap().push((recipient.0, message.0));
        self.outcome(recipient).map(|_| ())
    }
}

/// recipient store double backed by a plain vector
pub struct InMemoryRecipientStore {
    recipients: Mutex<Vec<i64>>,
    pub list_calls: Arc<Mutex<usize>>,
    fail_listing: bool,
}

impl InMemoryRecipientStore {
    pub fn with_recipients(recipients: Vec<i64>) -> Self {
        Self {
            recipients: Mutex::new(recipients),
            list_calls: Arc::new(Mutex::new(0)),
            fail_listing: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            recipients: Mutex::new(Vec::new()),
            list_calls: Arc::new(Mutex::new(0)),
            fail_listing: true,
        }
    }
}

#[async_trait]
impl RecipientStore for InMemoryRecipientStore {
    async fn upsert_user(
        &self,
        telegram_user_id: i64,
        _first_name: Option<&str>,
        _username: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut recipients = self.recipients.lock().unwrap();
        if !recipients.contains(&telegram_user_id) {
            recipients.push(telegram_user_id);
        }
        Ok(())
    }

    async fn list_recipients(&self) -> Result<Vec<i64>, StoreError> {
        *self.list_calls.lock().unwrap() += 1;
        if self.fail_listing {
            return Err(StoreError::DatabaseError("connection refused".into()));
        }
        Ok(self.recipients.lock().unwrap().clone())
    }

    async fn statistics(&self) -> Result<UsageStatistics, StoreError> {
        let total_users = self.recipients.lock().unwrap().len() as i64;
        Ok(UsageStatistics {
            total_users,
            new_today: 0,
            new_last_7d: 0,
            new_last_30d: 0,
            total_balance: 0.0,
            total_spent: 0.0,
            first_join: None,
            last_join: None,
        })
    }
}
