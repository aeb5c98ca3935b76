use log::{debug, error};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

use crate::bot::BotContext;
use crate::broadcast::content::{MediaItem, MediaKind, PostContent};
use crate::broadcast::session::{ComposedPost, LabelOutcome, MailingPhase, SessionError};
use crate::broadcast::FinalizedGroup;
use crate::keyboards;
use crate::localization::Lang;
use crate::utils::MessageFormatter;

/// consumes admin input while a mailing session is active
pub struct MailingHandler;

impl MailingHandler {
    /// routes one admin message into the active session, if any; returns
    /// whether the message was consumed by the mailing dialog
    pub async fn handle_admin_message(ctx: &BotContext, msg: &Message) -> ResponseResult<bool> {
        let admin_id = match msg.from.as_ref() {
            Some(user) => user.id.0 as i64,
            None => return Ok(false),
        };
        let phase = match ctx.sessions.phase(admin_id).await {
            Some(phase) => phase,
            None => return Ok(false),
        };
        let lang = Lang::from_code(
            msg.from
                .as_ref()
                .and_then(|user| user.language_code.as_deref()),
        );

        match phase {
            MailingPhase::AwaitingContent => {
                // grouped uploads go through the aggregator and come back as
                // one media group once the burst settles
                if let Some(group_id) = msg.media_group_id() {
                    if let Some(item) = Self::media_item_from(msg) {
                        ctx.aggregator
                            .observe(admin_id, group_id, item)
                            .await;
                    }
                    return Ok(true);
                }
                match Self::single_content_from(msg) {
                    Some(content) => {
                        Self::capture_content(ctx, msg.chat.id, admin_id, lang, content).await?;
                    }
                    None => {
                        // not text or media, ignore
                        debug!("Admin {}: ignoring non-content input", admin_id);
                    }
                }
                Ok(true)
            }
            MailingPhase::AwaitingButtonLabel => {
                if let Some(label) = msg.text() {
                    match ctx.sessions.set_label(admin_id, label).await {
                        Ok(LabelOutcome::NeedsTarget) => {
                            ctx.bot
                                .send_message(msg.chat.id, lang.mailing_enter_target())
                                .await?;
                        }
                        Ok(LabelOutcome::Ready(post)) => {
                            Self::send_preview(ctx, msg.chat.id, lang, &post).await?;
                        }
                        Err(e) => {
                            debug!("Admin {}: label rejected: {}", admin_id, e);
                        }
                    }
                }
                Ok(true)
            }
            MailingPhase::AwaitingButtonTarget => {
                if let Some(target) = msg.text() {
                    match ctx.sessions.set_target(admin_id, target).await {
                        Ok(post) => {
                            Self::send_preview(ctx, msg.chat.id, lang, &post).await?;
                        }
                        Err(SessionError::InvalidButtonTarget(_)) => {
                            // stay in the target phase and let the admin retry
                            ctx.bot
                                .send_message(msg.chat.id, lang.mailing_invalid_target())
                                .await?;
                        }
                        Err(e) => {
                            debug!("Admin {}: target rejected: {}", admin_id, e);
                        }
                    }
                }
                Ok(true)
            }
            // these phases are driven by inline keyboard callbacks; stray
            // messages are swallowed so they cannot derail the dialog
            MailingPhase::AwaitingButtonChoice
            | MailingPhase::AwaitingButtonKind
            | MailingPhase::AwaitingConfirmation => Ok(true),
        }
    }

    /// called by the aggregator pump once a media group burst has settled
    pub async fn handle_finalized_group(ctx: &BotContext, group: FinalizedGroup) -> ResponseResult<()> {
        let admin_id = group.admin_id;
        let lang = ctx.sessions.lang(admin_id).await.unwrap_or_default();
        let content = PostContent::MediaGroup { items: group.items };
        match ctx.sessions.set_content(admin_id, content).await {
            Ok(()) => {
                ctx.bot
                    .send_message(ChatId(admin_id), lang.mailing_add_button_question())
                    .reply_markup(keyboards::button_choice(lang))
                    .await?;
            }
            Err(e) => {
                // session was cancelled or already has content; nothing to do
                debug!("Admin {}: finalized media group dropped: {}", admin_id, e);
            }
        }
        Ok(())
    }

    async fn capture_content(
        ctx: &BotContext,
        chat_id: ChatId,
        admin_id: i64,
        lang: Lang,
        content: PostContent,
    ) -> ResponseResult<()> {
        match ctx.sessions.set_content(admin_id, content).await {
            Ok(()) => {
                ctx.bot
                    .send_message(chat_id, lang.mailing_add_button_question())
                    .reply_markup(keyboards::button_choice(lang))
                    .await?;
            }
            Err(e) => {
                debug!("Admin {}: content rejected: {}", admin_id, e);
            }
        }
        Ok(())
    }

    /// renders the post exactly as recipients will receive it, then shows the
    /// confirm/cancel controls; a render failure is reported inline and the
    /// controls are kept so the session survives
    pub async fn send_preview(
        ctx: &BotContext,
        chat_id: ChatId,
        lang: Lang,
        post: &ComposedPost,
    ) -> ResponseResult<()> {
        let button = post.button.as_ref();
        let rendered = match &post.content {
            PostContent::Text { body } => ctx
                .transport
                .send_text(chat_id, body, button)
                .await
                .map(|_| ()),
            PostContent::MediaGroup { items } => {
                match ctx.transport.send_media_group(chat_id, items).await {
                    Ok(_) => match button {
                        Some(button) => ctx
                            .transport
                            .send_text(chat_id, "👆", Some(button))
                            .await
                            .map(|_| ()),
                        None => Ok(()),
                    },
                    Err(e) => Err(e),
                }
            }
            other => match other.single_item() {
                Some(item) => ctx
                    .transport
                    .send_media(chat_id, &item, button)
                    .await
                    .map(|_| ()),
                None => Ok(()),
            },
        };

        if let Err(e) = rendered {
            error!("Preview render failed for chat {}: {}", chat_id.0, e);
            ctx.bot
                .send_message(
                    chat_id,
                    lang.mailing_preview_failed(&MessageFormatter::escape_html(&e.to_string())),
                )
                .await?;
        }

        let escaped_label = post
            .button
            .as_ref()
            .map(|b| MessageFormatter::escape_html(&b.label));
        ctx.bot
            .send_message(
                chat_id,
                lang.mailing_confirm_question(&post.content, escaped_label.as_deref()),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::confirm(lang))
            .await?;
        Ok(())
    }

    /// text or a single media message becomes post content directly
    fn single_content_from(msg: &Message) -> Option<PostContent> {
        if let Some(text) = msg.text() {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            return Some(PostContent::Text {
                body: text.to_string(),
            });
        }
        let caption = msg.caption().map(|c| c.to_string());
        if let Some(sizes) = msg.photo() {
            let largest = sizes.last()?;
            return Some(PostContent::Photo {
                file_id: largest.file.id.clone(),
                caption,
            });
        }
        if let Some(video) = msg.video() {
            return Some(PostContent::Video {
                file_id: video.file.id.clone(),
                caption,
            });
        }
        if let Some(document) = msg.document() {
            return Some(PostContent::Document {
                file_id: document.file.id.clone(),
                caption,
            });
        }
        None
    }

    /// one element of a grouped upload
    fn media_item_from(msg: &Message) -> Option<MediaItem> {
        let caption = msg.caption().map(|c| c.to_string());
        if let Some(sizes) = msg.photo() {
            let largest = sizes.last()?;
            return Some(MediaItem::new(
                MediaKind::Photo,
                largest.file.id.clone(),
                caption,
            ));
        }
        if let Some(video) = msg.video() {
            return Some(MediaItem::new(MediaKind::Video, video.file.id.clone(), caption));
        }
        if let Some(document) = msg.document() {
            return Some(MediaItem::new(
                MediaKind::Document,
                document.file.id.clone(),
                caption,
            ));
        }
        None
    }
}
