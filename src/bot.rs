use log::{error, info, warn};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::utils::command::BotCommands;
use tokio::sync::mpsc;

use crate::broadcast::{FinalizedGroup, MailingSessions, MediaGroupAggregator};
use crate::config::BotConfig;
use crate::handlers::{CallbackHandler, CommandHandler, MailingHandler};
use crate::recipient_store::RecipientStore;
use crate::transport::{TelegramTransport, Transport};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "start a broadcast (admins)")]
    Mailing,
    #[command(description = "cancel the broadcast draft (admins)")]
    Cancel,
    #[command(description = "usage statistics (admins)")]
    Stats,
}

#[derive(Clone)]
pub struct BotContext {
    pub bot: Arc<Bot>,
    pub config: Arc<BotConfig>,
    pub store: Arc<dyn RecipientStore>,
    pub transport: Arc<dyn Transport>,
    pub sessions: Arc<MailingSessions>,
    pub aggregator: Arc<MediaGroupAggregator>,
}

pub struct ShopBot {
    ctx: BotContext,
    group_rx: mpsc::UnboundedReceiver<FinalizedGroup>,
}

impl ShopBot {
    pub fn new(config: BotConfig, store: Arc<dyn RecipientStore>) -> Self {
        let bot = Arc::new(Bot::new(&config.bot_token));
        let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(bot.clone()));
        let sessions = Arc::new(MailingSessions::new(config.app_url.clone()));
        let (aggregator, group_rx) = MediaGroupAggregator::new(config.group_debounce);

        let ctx = BotContext {
            bot,
            config: Arc::new(config),
            store,
            transport,
            sessions,
            aggregator: Arc::new(aggregator),
        };
        Self { ctx, group_rx }
    }

    pub async fn run(self) {
        info!("Starting Telegram bot...");

        let ctx = self.ctx;
        if let Err(e) = ctx.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {}", e);
        }

        // media groups settle on a timer, so finalizations arrive out of band
        // and are pumped back into the session machinery here
        let pump_ctx = ctx.clone();
        let mut group_rx = self.group_rx;
        tokio::spawn(async move {
            info!("Starting media group finalization pump");
            while let Some(group) = group_rx.recv().await {
                if let Err(e) = MailingHandler::handle_finalized_group(&pump_ctx, group).await {
                    error!("Failed to process finalized media group: {}", e);
                }
            }
        });

        let handler = dptree::entry()
            .branch(Update::filter_callback_query().endpoint({
                let ctx = ctx.clone();
                move |query: CallbackQuery| {
                    let ctx = ctx.clone();
                    async move { CallbackHandler::handle_callback_query(ctx, query).await }
                }
            }))
            .branch(
                Update::filter_message()
                    .branch(dptree::entry().filter_command::<Command>().endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message, cmd: Command| {
                            let ctx = ctx.clone();
                            async move { CommandHandler::handle_command(ctx, msg, cmd).await }
                        }
                    }))
                    .branch(dptree::endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message| {
                            let ctx = ctx.clone();
                            async move { Self::handle_message(ctx, msg).await }
                        }
                    })),
            );

        Dispatcher::builder((*ctx.bot).clone(), handler)
            .error_handler(
                teloxide::error_handlers::LoggingErrorHandler::with_custom_text(
                    "An error from the update listener",
                ),
            )
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_message(ctx: BotContext, msg: Message) -> ResponseResult<()> {
        let user_id = msg.from.as_ref().map(|user| user.id.0 as i64).unwrap_or(0);

        // plain messages only matter while an admin is composing a broadcast;
        // everything else in the shop happens inside the web app
        if ctx.config.is_admin(user_id) {
            MailingHandler::handle_admin_message(&ctx, &msg).await?;
        }
        Ok(())
    }
}
