use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use contact_intake::bot::{self, bot_commands};
use contact_intake::config::{BotConfig, LogFormat};
use contact_intake::intake::IntakeController;
use contact_intake::localization::LocalizationManager;
use contact_intake::storage::{RecordSink, SpreadsheetSink};

/// Set up the global tracing subscriber
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env().context("Invalid bot configuration")?;

    init_tracing(config.log_format);

    info!("Starting Contact Intake Telegram Bot");
    info!(
        output_path = %config.output_path.display(),
        blocked_users = config.blocklist.len(),
        "Configuration loaded"
    );

    let sink = Arc::new(SpreadsheetSink::new(&config.output_path));
    sink.ensure_initialized()
        .with_context(|| format!("Failed to initialize {}", config.output_path.display()))?;

    let localization =
        Arc::new(LocalizationManager::new().context("Failed to load message catalogue")?);
    let controller = Arc::new(IntakeController::new(sink, config.blocklist.clone()));

    let bot = Bot::new(config.token.expose());

    // Updates queued while the bot was offline are stale
    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .context("Failed to drop pending updates")?;
    bot.set_my_commands(bot_commands(&localization))
        .await
        .context("Failed to register bot commands")?;

    info!("Bot initialized, starting dispatcher");

    let handler = Update::filter_message().endpoint(bot::message_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![controller, localization])
        .default_handler(|update| async move {
            debug!(update = ?update, "Ignoring unsupported update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
