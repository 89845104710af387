//! Rule-driven Signal responder - Main entry point.

use anyhow::Context;
use command_table::RulesStore;
use response_macros::ResponseSynthesizer;
use responder_bot::commands::*;
use responder_bot::config::{Config, LogFormat};
use responder_bot::error::AppResult;
use responder_bot::macros::build_registry;
use responder_bot::{ChatGateway, Dispatcher, Inbox, Outbox};
use signal_client::{MessageReceiver, SignalClient};
use std::sync::Arc;
use tokio::signal;
use tokio_stream::StreamExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level, &config.bot.log_format);

    info!("Starting responder bot...");

    let rules = RulesStore::open(&config.bot.rules_file).await?;

    let registry = Arc::new(build_registry(&config.macros)?);
    let synthesizer = Arc::new(
        ResponseSynthesizer::new(registry)
            .with_timeout(config.macros.timeout)
            .with_max_reply_len(config.bot.max_reply_len),
    );

    let signal = SignalClient::new(&config.signal.service_url, &config.signal.phone_number)
        .context("Failed to create Signal client")?;

    if !signal.health_check().await {
        error!("Signal API not reachable at {}", config.signal.service_url);
        return Err(anyhow::anyhow!("Signal API not reachable").into());
    }
    info!("Signal API healthy");

    let gateway: Arc<dyn ChatGateway> = Arc::new(signal.clone());
    let outbox = Arc::new(Outbox::new(gateway.clone(), config.bot.reply_cooldown));

    // Create system command handlers
    let handlers: Vec<Box<dyn CommandHandler>> = vec![
        Box::new(WhoamiHandler::new()),
        Box::new(ReloadHandler::new(rules.clone())),
        Box::new(StopHandler::new()),
        Box::new(ChannelsHandler::new(gateway)),
    ];
    info!("Registered {} system commands", handlers.len());

    let dispatcher = Arc::new(Dispatcher::new(rules, synthesizer, handlers, outbox.clone()));
    let (inbox, mut stopped) = Inbox::new(dispatcher);

    info!("Listening for messages...");

    // Start message receiver
    let receiver = MessageReceiver::new(signal, config.signal.poll_interval);
    let mut stream = Box::pin(receiver.stream());

    // Main message loop
    loop {
        tokio::select! {
            Some(message) = stream.next() => {
                inbox.submit(message).await;
            }
            Some(()) = stopped.recv() => {
                break;
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Shutting down...");
    inbox.flush().await;
    outbox.flush().await;
    Ok(())
}

fn init_logging(level: &str, format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Plain => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
