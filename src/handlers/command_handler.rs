use log::{error, info};
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::bot::{BotContext, Command};
use crate::keyboards;
use crate::localization::Lang;

pub struct CommandHandler;

impl CommandHandler {
    pub async fn handle_command(ctx: BotContext, msg: Message, cmd: Command) -> ResponseResult<()> {
        let lang = Lang::from_code(
            msg.from
                .as_ref()
                .and_then(|user| user.language_code.as_deref()),
        );

        match cmd {
            Command::Start => {
                Self::handle_start_command(ctx, msg, lang).await?;
            }
            Command::Mailing => {
                Self::handle_mailing_command(ctx, msg, lang).await?;
            }
            Command::Cancel => {
                Self::handle_cancel_command(ctx, msg, lang).await?;
            }
            Command::Stats => {
                Self::handle_stats_command(ctx, msg, lang).await?;
            }
        }
        Ok(())
    }

    async fn handle_start_command(
        ctx: BotContext,
        msg: Message,
        lang: Lang,
    ) -> ResponseResult<()> {
        let user_id = msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(0);
        let first_name = msg.from.as_ref().map(|user| user.first_name.as_str());
        let username = msg.from.as_ref().and_then(|user| user.username.as_deref());

        if let Err(e) = ctx.store.upsert_user(user_id, first_name, username).await {
            error!("Failed to upsert user {}: {}", user_id, e);
            ctx.bot
                .send_message(msg.chat.id, lang.error_account_access())
                .await?;
            return Ok(());
        }

        ctx.bot
            .send_message(msg.chat.id, lang.welcome())
            .reply_markup(keyboards::app_link(lang, &ctx.config.app_url))
            .await?;
        Ok(())
    }

    async fn handle_mailing_command(
        ctx: BotContext,
        msg: Message,
        lang: Lang,
    ) -> ResponseResult<()> {
        let admin_id = msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(0);
        if !ctx.config.is_admin(admin_id) {
            ctx.bot
                .send_message(msg.chat.id, lang.not_permitted())
                .await?;
            return Ok(());
        }

        // a fresh draft always starts clean
        ctx.aggregator.discard(admin_id).await;
        let replaced = ctx.sessions.start(admin_id, lang).await;
        if replaced {
            ctx.bot
                .send_message(msg.chat.id, lang.mailing_restarted())
                .await?;
        }
        ctx.bot
            .send_message(msg.chat.id, lang.mailing_enter_content())
            .await?;
        Ok(())
    }

    async fn handle_cancel_command(
        ctx: BotContext,
        msg: Message,
        lang: Lang,
    ) -> ResponseResult<()> {
        let admin_id = msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(0);
        if !ctx.config.is_admin(admin_id) {
            ctx.bot
                .send_message(msg.chat.id, lang.not_permitted())
                .await?;
            return Ok(());
        }

        let had_session = ctx.sessions.cancel(admin_id).await;
        ctx.aggregator.discard(admin_id).await;
        let reply = if had_session {
            lang.mailing_cancelled()
        } else {
            lang.mailing_no_session()
        };
        ctx.bot.send_message(msg.chat.id, reply).await?;
        Ok(())
    }

    async fn handle_stats_command(
        ctx: BotContext,
        msg: Message,
        lang: Lang,
    ) -> ResponseResult<()> {
        let admin_id = msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(0);
        if !ctx.config.is_admin(admin_id) {
            ctx.bot
                .send_message(msg.chat.id, lang.not_permitted())
                .await?;
            return Ok(());
        }

        match ctx.store.statistics().await {
            Ok(stats) => {
                info!("Admin {} requested statistics", admin_id);
                ctx.bot
                    .send_message(msg.chat.id, lang.stats_report(&stats))
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
            Err(e) => {
                error!("Failed to load statistics: {}", e);
                ctx.bot
                    .send_message(msg.chat.id, lang.stats_failed())
                    .await?;
            }
        }
        Ok(())
    }
}
