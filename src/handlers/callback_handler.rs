use log::{debug, error, info};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, MaybeInaccessibleMessage, MessageId, ParseMode};

use crate::bot::BotContext;
use crate::broadcast::content::ButtonKind;
use crate::broadcast::session::{ComposedPost, SessionError};
use crate::broadcast::BroadcastDispatcher;
use crate::handlers::MailingHandler;
use crate::keyboards;
use crate::localization::Lang;

pub struct CallbackHandler;

impl CallbackHandler {
    fn get_chat_id(message: &MaybeInaccessibleMessage) -> ChatId {
        match message {
            MaybeInaccessibleMessage::Regular(msg) => msg.chat.id,
            MaybeInaccessibleMessage::Inaccessible(msg) => msg.chat.id,
        }
    }

    fn get_message_id(message: &MaybeInaccessibleMessage) -> Option<MessageId> {
        match message {
            MaybeInaccessibleMessage::Regular(msg) => Some(msg.id),
            MaybeInaccessibleMessage::Inaccessible(_) => None,
        }
    }

    pub async fn handle_callback_query(ctx: BotContext, query: CallbackQuery) -> ResponseResult<()> {
        if let Some(data) = query.data.clone() {
            if let Some(message) = &query.message {
                let admin_id = query.from.id.0 as i64;
                let lang = Lang::from_code(query.from.language_code.as_deref());
                if ctx.config.is_admin(admin_id) {
                    let chat_id = Self::get_chat_id(message);
                    let prompt_id = Self::get_message_id(message);
                    match data.as_str() {
                        keyboards::CB_BUTTON_YES => {
                            Self::handle_button_yes(&ctx, chat_id, prompt_id, admin_id, lang)
                                .await?;
                        }
                        keyboards::CB_BUTTON_NO => {
                            Self::handle_button_no(&ctx, chat_id, prompt_id, admin_id, lang)
                                .await?;
                        }
                        keyboards::CB_KIND_LINK => {
                            Self::handle_kind(
                                &ctx,
                                chat_id,
                                prompt_id,
                                admin_id,
                                lang,
                                ButtonKind::Link,
                            )
                            .await?;
                        }
                        keyboards::CB_KIND_APP => {
                            Self::handle_kind(
                                &ctx,
                                chat_id,
                                prompt_id,
                                admin_id,
                                lang,
                                ButtonKind::InAppView,
                            )
                            .await?;
                        }
                        keyboards::CB_CONFIRM => {
                            Self::handle_confirm(&ctx, chat_id, prompt_id, admin_id, lang).await?;
                        }
                        keyboards::CB_CANCEL => {
                            Self::handle_cancel(&ctx, chat_id, prompt_id, admin_id, lang).await?;
                        }
                        _ => {}
                    }
                }
            }
        }
        ctx.bot.answer_callback_query(&query.id).await?;
        Ok(())
    }

    async fn handle_button_yes(
        ctx: &BotContext,
        chat_id: ChatId,
        prompt_id: Option<MessageId>,
        admin_id: i64,
        lang: Lang,
    ) -> ResponseResult<()> {
        match ctx.sessions.request_button(admin_id).await {
            Ok(()) => {
                Self::retire_prompt(ctx, chat_id, prompt_id, lang.btn_add_button()).await;
                ctx.bot
                    .send_message(chat_id, lang.mailing_choose_kind())
                    .reply_markup(keyboards::button_kind(lang))
                    .await?;
            }
            Err(e) => Self::report_session_error(ctx, chat_id, lang, admin_id, e).await?,
        }
        Ok(())
    }

    async fn handle_button_no(
        ctx: &BotContext,
        chat_id: ChatId,
        prompt_id: Option<MessageId>,
        admin_id: i64,
        lang: Lang,
    ) -> ResponseResult<()> {
        match ctx.sessions.decline_button(admin_id).await {
            Ok(post) => {
                Self::retire_prompt(ctx, chat_id, prompt_id, lang.btn_skip_button()).await;
                MailingHandler::send_preview(ctx, chat_id, lang, &post).await?;
            }
            Err(e) => Self::report_session_error(ctx, chat_id, lang, admin_id, e).await?,
        }
        Ok(())
    }

    async fn handle_kind(
        ctx: &BotContext,
        chat_id: ChatId,
        prompt_id: Option<MessageId>,
        admin_id: i64,
        lang: Lang,
        kind: ButtonKind,
    ) -> ResponseResult<()> {
        match ctx.sessions.choose_kind(admin_id, kind).await {
            Ok(()) => {
                let ack = match kind {
                    ButtonKind::Link => lang.btn_kind_link(),
                    ButtonKind::InAppView => lang.btn_kind_app(),
                };
                Self::retire_prompt(ctx, chat_id, prompt_id, ack).await;
                // in-app buttons get the shop URL automatically, so the label
                // is the only thing left to ask in either branch
                ctx.bot
                    .send_message(chat_id, lang.mailing_enter_label())
                    .await?;
            }
            Err(e) => Self::report_session_error(ctx, chat_id, lang, admin_id, e).await?,
        }
        Ok(())
    }

    async fn handle_confirm(
        ctx: &BotContext,
        chat_id: ChatId,
        prompt_id: Option<MessageId>,
        admin_id: i64,
        lang: Lang,
    ) -> ResponseResult<()> {
        match ctx.sessions.take_confirmed(admin_id).await {
            Ok(post) => {
                Self::retire_prompt(ctx, chat_id, prompt_id, lang.mailing_started_ack()).await;
                Self::start_broadcast_in_background(ctx.clone(), chat_id, lang, post);
            }
            Err(e) => Self::report_session_error(ctx, chat_id, lang, admin_id, e).await?,
        }
        Ok(())
    }

    async fn handle_cancel(
        ctx: &BotContext,
        chat_id: ChatId,
        prompt_id: Option<MessageId>,
        admin_id: i64,
        lang: Lang,
    ) -> ResponseResult<()> {
        let had_session = ctx.sessions.cancel(admin_id).await;
        ctx.aggregator.discard(admin_id).await;
        if had_session {
            Self::retire_prompt(ctx, chat_id, prompt_id, lang.mailing_cancelled()).await;
            if prompt_id.is_none() {
                ctx.bot
                    .send_message(chat_id, lang.mailing_cancelled())
                    .await?;
            }
        } else {
            ctx.bot
                .send_message(chat_id, lang.mailing_no_session())
                .await?;
        }
        Ok(())
    }

    /// replaces an answered inline prompt so its keyboard cannot be tapped
    /// twice; best-effort, an unreachable prompt is simply left as is
    async fn retire_prompt(
        ctx: &BotContext,
        chat_id: ChatId,
        prompt_id: Option<MessageId>,
        text: &str,
    ) {
        if let Some(prompt_id) = prompt_id {
            let _ = ctx
                .transport
                .edit_message_text(chat_id, prompt_id, text)
                .await;
        }
    }

    async fn report_session_error(
        ctx: &BotContext,
        chat_id: ChatId,
        lang: Lang,
        admin_id: i64,
        e: SessionError,
    ) -> ResponseResult<()> {
        match e {
            SessionError::NotActive(_) => {
                ctx.bot
                    .send_message(chat_id, lang.mailing_session_expired())
                    .await?;
            }
            // an out-of-phase tap (e.g. on an already answered keyboard) is
            // swallowed, the current prompt stands
            other => {
                debug!("Admin {}: callback ignored: {}", admin_id, other);
            }
        }
        Ok(())
    }

    /// runs the fan-out on its own task so the dispatcher loop never blocks
    /// message intake for other admins
    fn start_broadcast_in_background(
        ctx: BotContext,
        admin_chat: ChatId,
        lang: Lang,
        post: ComposedPost,
    ) {
        tokio::spawn(async move {
            let status = ctx
                .bot
                .send_message(admin_chat, lang.mailing_in_progress())
                .await
                .ok();

            let dispatcher = BroadcastDispatcher::new(ctx.transport.clone(), ctx.store.clone());
            match dispatcher.dispatch(&post.content, post.button.as_ref()).await {
                Ok(report) => {
                    // best-effort removal of the progress message
                    if let Some(status) = &status {
                        let _ = ctx.transport.delete_message(admin_chat, status.id).await;
                    }
                    info!(
                        "Broadcast for admin {} done: {}/{} delivered",
                        admin_chat.0, report.succeeded, report.total_recipients
                    );
                    if let Err(e) = ctx
                        .bot
                        .send_message(admin_chat, lang.mailing_report(&report))
                        .parse_mode(ParseMode::Html)
                        .await
                    {
                        error!(
                            "Failed to deliver broadcast report to admin {}: {}",
                            admin_chat.0, e
                        );
                    }
                }
                Err(e) => {
                    error!("Broadcast aborted before sending: {}", e);
                    let _ = ctx
                        .bot
                        .send_message(admin_chat, lang.error_recipient_list())
                        .await;
                }
            }
        });
    }
}
