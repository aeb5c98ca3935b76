use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InputFile, InputMedia, InputMediaDocument, InputMediaPhoto, InputMediaVideo, MessageId,
};
use teloxide::{ApiError, RequestError};

use crate::broadcast::content::{group_caption, MediaItem, MediaKind, PostButton};
use crate::keyboards;

/// per-send failure, already classified at the transport boundary; the
/// broadcast loop only asks whether the recipient itself is gone
#[derive(Debug)]
pub enum SendError {
    /// the recipient blocked the bot, deleted the account or the chat does
    /// not exist; no future send to this recipient can succeed
    RecipientUnreachable(String),
    /// any other transport failure (network, rate limit, malformed request)
    Transport(String),
}

impl SendError {
    pub fn is_recipient_unreachable(&self) -> bool {
        matches!(self, SendError::RecipientUnreachable(_))
    }
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::RecipientUnreachable(detail) => {
                write!(f, "recipient unreachable: {}", detail)
            }
            SendError::Transport(detail) => write!(f, "send failed: {}", detail),
        }
    }
}

impl Error for SendError {}

impl From<RequestError> for SendError {
    fn from(err: RequestError) -> Self {
        // classification is driven by the typed API error, not by matching
        // error message text
        match &err {
            RequestError::Api(api) => match api {
                ApiError::BotBlocked
                | ApiError::ChatNotFound
                | ApiError::UserDeactivated
                | ApiError::BotKicked
                | ApiError::BotKickedFromSupergroup
                | ApiError::GroupDeactivated
                | ApiError::CantInitiateConversation
                | ApiError::CantTalkWithBots => SendError::RecipientUnreachable(err.to_string()),
                _ => SendError::Transport(err.to_string()),
            },
            _ => SendError::Transport(err.to_string()),
        }
    }
}

/// messaging gateway the broadcast machinery talks through; implemented by the
/// live bot API client and by the recording mock in tests
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        recipient: ChatId,
        text: &str,
        button: Option<&PostButton>,
    ) -> Result<MessageId, SendError>;

    async fn send_media(
        &self,
        recipient: ChatId,
        item: &MediaItem,
        button: Option<&PostButton>,
    ) -> Result<MessageId, SendError>;

    /// sends all items as one album; the derived group caption is attached to
    /// the album as a whole. grouped sends cannot carry an inline keyboard
    async fn send_media_group(
        &self,
        recipient: ChatId,
        items: &[MediaItem],
    ) -> Result<Vec<MessageId>, SendError>;

    async fn edit_message_text(
        &self,
        recipient: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), SendError>;

    async fn delete_message(&self, recipient: ChatId, message: MessageId)
        -> Result<(), SendError>;
}

/// Telegram Bot API transport
pub struct TelegramTransport {
    bot: Arc<Bot>,
}

impl TelegramTransport {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(
        &self,
        recipient: ChatId,
        text: &str,
        button: Option<&PostButton>,
    ) -> Result<MessageId, SendError> {
        let request = self.bot.send_message(recipient, text);
        let message = match button {
            Some(button) => request.reply_markup(keyboards::post_button(button)).await?,
            None => request.await?,
        };
        Ok(message.id)
    }

    async fn send_media(
        &self,
        recipient: ChatId,
        item: &MediaItem,
        button: Option<&PostButton>,
    ) -> Result<MessageId, SendError> {
        let file = InputFile::file_id(item.file_id.clone());
        let message = match item.kind {
            MediaKind::Photo => {
                let mut request = self.bot.send_photo(recipient, file);
                request.caption = item.caption.clone();
                request.reply_markup = button.map(|b| keyboards::post_button(b).into());
                request.await?
            }
            MediaKind::Video => {
                let mut request = self.bot.send_video(recipient, file);
                request.caption = item.caption.clone();
                request.reply_markup = button.map(|b| keyboards::post_button(b).into());
                request.await?
            }
            MediaKind::Document => {
                let mut request = self.bot.send_document(recipient, file);
                request.caption = item.caption.clone();
                request.reply_markup = button.map(|b| keyboards::post_button(b).into());
                request.await?
            }
        };
        Ok(message.id)
    }

    async fn send_media_group(
        &self,
        recipient: ChatId,
        items: &[MediaItem],
    ) -> Result<Vec<MessageId>, SendError> {
        let caption = group_caption(items).map(|c| c.to_string());
        let media: Vec<InputMedia> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let file = InputFile::file_id(item.file_id.clone());
                // the album caption goes on the first item only; telegram
                // shows it for the group when no other item is captioned
                let item_caption = if i == 0 { caption.clone() } else { None };
                match item.kind {
                    MediaKind::Photo => {
                        let mut m = InputMediaPhoto::new(file);
                        m.caption = item_caption;
                        InputMedia::Photo(m)
                    }
                    MediaKind::Video => {
                        let mut m = InputMediaVideo::new(file);
                        m.caption = item_caption;
                        InputMedia::Video(m)
                    }
                    MediaKind::Document => {
                        let mut m = InputMediaDocument::new(file);
                        m.caption = item_caption;
                        InputMedia::Document(m)
                    }
                }
            })
            .collect();

        let messages = self.bot.send_media_group(recipient, media).await?;
        Ok(messages.into_iter().map(|m| m.id).collect())
    }

    async fn edit_message_text(
        &self,
        recipient: ChatId,
        message: MessageId,
        text: &str,
    ) -> Result<(), SendError> {
        self.bot.edit_message_text(recipient, message, text).await?;
        Ok(())
    }

    async fn delete_message(
        &self,
        recipient: ChatId,
        message: MessageId,
    ) -> Result<(), SendError> {
        self.bot.delete_message(recipient, message).await?;
        Ok(())
    }
}
