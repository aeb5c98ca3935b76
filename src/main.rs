use clap::Parser;
use deadpool_postgres::Runtime;
use log::info;
use std::sync::Arc;
use tokio_postgres::NoTls;

use gift_shop_bot::bot::ShopBot;
use gift_shop_bot::config::BotConfig;
use gift_shop_bot::migrations::MigrationManager;
use gift_shop_bot::recipient_store::PgRecipientStore;

#[derive(Parser)]
#[command(name = "gift-shop-bot")]
#[command(about = "Telegram shop bot with an admin broadcast pipeline")]
struct Args {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        match e {
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // .env file not found, which is fine
            }
            _ => {
                eprintln!("warning: failed to load .env file: {}", e);
            }
        }
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let _args = Args::parse();

    let config = BotConfig::from_env()?;

    let mut pool_config = deadpool_postgres::Config::new();
    pool_config.url = Some(config.database_url.clone());
    let pool = pool_config.create_pool(Some(Runtime::Tokio1), NoTls)?;

    MigrationManager::run_migrations(&pool).await?;

    info!("Starting bot...");

    let store = Arc::new(PgRecipientStore::new(pool));
    let bot = ShopBot::new(config, store);
    bot.run().await;

    Ok(())
}
