use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::composer::Composer;
use crate::config::BotConfig;
use crate::holidays::{
    BrowserFetcher, ChallengeFetcher, HolidaySource, HolidayTable, LocalHolidaySource,
    PageFetcher, SourceKind, WebHolidaySource,
};
use crate::responder::ResponderContext;
use crate::responder_manager::ResponderManager;
use crate::responders::{HolidayResponder, PrivateChatResponder, StartResponder};
use crate::telegram::{BotCommand, Message, TelegramClient};
use crate::toasts::ToastStore;

/// Pause after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Build the holiday source selected in the config
pub fn build_source(config: &BotConfig) -> Result<Arc<dyn HolidaySource>> {
    let source: Arc<dyn HolidaySource> = match config.source {
        SourceKind::Local => {
            let table = HolidayTable::load(&config.holidays_path());
            Arc::new(LocalHolidaySource::new(table))
        }
        SourceKind::Web => {
            let primary: Arc<dyn PageFetcher> = Arc::new(
                BrowserFetcher::new(config.fetch_timeout)
                    .context("Failed to build primary HTTP client")?,
            );
            let fallback: Option<Arc<dyn PageFetcher>> = if config.antibot_fallback {
                Some(Arc::new(
                    ChallengeFetcher::new(config.fetch_timeout)
                        .context("Failed to build fallback HTTP client")?,
                ))
            } else {
                None
            };

            Arc::new(WebHolidaySource::new(
                config.holidays_url.clone(),
                primary,
                fallback,
                config.fetch_timeout,
                config.max_concurrent_fetches,
            ))
        }
    };

    info!("✅ Holiday source ready: {}", source.name());
    Ok(source)
}

/// Responder chain wired to a composer
pub fn build_responders(composer: Arc<Composer>) -> ResponderManager {
    let mut manager = ResponderManager::new();
    manager.register(Arc::new(StartResponder::new()));
    manager.register(Arc::new(HolidayResponder::new(composer.clone())));
    manager.register(Arc::new(PrivateChatResponder::new(composer)));
    manager
}

fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "О боте"),
        BotCommand::new("povod", "Показать праздник и тост"),
    ]
}

/// Load data, register commands and run the polling loop until Ctrl-C
pub async fn run(config: BotConfig) -> Result<()> {
    let toasts = Arc::new(ToastStore::load(&config.toasts_path()));
    if toasts.is_empty() {
        warn!("⚠️  No toast templates loaded, holiday replies will report the problem");
    }

    let source = build_source(&config)?;
    let composer = Arc::new(Composer::with_entropy(source, toasts));
    let manager = Arc::new(build_responders(composer));
    info!("📋 Responder chain: {:?}", manager.list_responders());

    let telegram = TelegramClient::new(&config.token).context("Failed to create Telegram client")?;
    let me = telegram.get_me().await.context("Failed to authenticate with Telegram")?;
    info!("✅ Connected to Telegram as {:?} (id: {})", me.username, me.id);

    if let Err(e) = telegram.set_my_commands(&bot_commands()).await {
        warn!("⚠️  Failed to register bot commands: {}", e);
    }

    tokio::select! {
        _ = poll_loop(telegram, manager, me.username) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
        }
    }

    Ok(())
}

async fn poll_loop(telegram: TelegramClient, manager: Arc<ResponderManager>, bot_username: Option<String>) {
    let mut offset: Option<i64> = None;
    info!("Starting polling loop...");

    loop {
        let updates = match telegram.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                error!("✗ Polling failed, retrying: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };

            // One task per message: a slow holiday fetch must not stall other chats
            let telegram = telegram.clone();
            let manager = manager.clone();
            let bot_username = bot_username.clone();
            tokio::spawn(async move {
                on_message(telegram, manager, message, bot_username).await;
            });
        }
    }
}

/// Build the responder context for a text message; other messages are ignored
fn message_context(message: Message, bot_username: Option<String>) -> Option<ResponderContext> {
    let text = message.text?;
    let sender = message
        .from
        .map(|u| u.username.unwrap_or(u.first_name))
        .unwrap_or_default();

    Some(ResponderContext {
        chat_id: message.chat.id,
        chat_kind: message.chat.kind,
        message_id: message.message_id,
        sender,
        message_body: text,
        bot_username,
    })
}

/// Route one incoming message through the responders and send the reply
async fn on_message(
    telegram: TelegramClient,
    manager: Arc<ResponderManager>,
    message: Message,
    bot_username: Option<String>,
) {
    let Some(context) = message_context(message, bot_username) else {
        return;
    };

    info!(
        chat_id = context.chat_id,
        chat_kind = ?context.chat_kind,
        sender = %context.sender,
        length = context.message_body.chars().count(),
        "📨 Received message"
    );
    debug!(chat_id = context.chat_id, message = %context.message_body, "Message text");

    let reply = match manager.process_message(&context).await {
        Ok(Some(reply)) => reply,
        Ok(None) => return,
        Err(e) => {
            error!("✗ Responder failed in chat {}: {}", context.chat_id, e);
            return;
        }
    };

    match telegram
        .send_message(context.chat_id, &reply, Some(context.message_id))
        .await
    {
        Ok(_) => info!("✓ Reply sent to chat {}", context.chat_id),
        Err(e) => error!("✗ Failed to send reply to chat {}: {}", context.chat_id, e),
    }
}
