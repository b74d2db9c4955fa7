//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: Configuration, Markup and Types
//! - Infrastructure: Feed download, Telegram, Matrix, console tools
//! - Application: Feed cache, Scheduler, Router, State
//! - Interface: Command Handlers
//!
#![recursion_limit = "256"]

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::application::broadcast::Broadcaster;
use crate::application::feed::PodcastFeed;
use crate::application::router::CommandRouter;
use crate::application::scheduler::{CheckParams, FeedChecker, SharedFeeds};
use crate::application::state::BotState;
use crate::domain::config::AppConfig;
use crate::domain::traits::{ChatProvider, FeedSource};
use crate::infrastructure::console::ConsoleChat;
use crate::infrastructure::http::FeedFetcher;
use crate::infrastructure::telegram::{TelegramChat, TelegramClient, TelegramService};
use crate::infrastructure::tools::ToolRunner;

/// Announces new podcast episodes and answers feed commands in chat.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path of the YAML configuration file
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,

    /// Run a single feed check, print announcements to stdout and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;
    if cli.check_config {
        config.validate()?;
        println!("{}", strings::logs::config_loaded(config.feeds.urls.len(), broadcast_target_count(&config)));
        return Ok(());
    }
    if cli.once {
        anyhow::ensure!(!config.feeds.urls.is_empty(), "No feeds configured");
    } else {
        config.validate()?;
    }

    // 2. Logging Setup
    let data_dir = PathBuf::from(&config.system.data_dir);
    let _guard = init_logging(&data_dir)?;
    tracing::info!("{}", strings::logs::STARTING);
    tracing::info!(
        "{}",
        strings::logs::config_loaded(config.feeds.urls.len(), broadcast_target_count(&config))
    );

    // 3. Feeds and State
    let state = BotState::load(&BotState::path_in(&data_dir));
    let source: Arc<dyn FeedSource> = Arc::new(FeedFetcher::new(config.feeds.http_timeout_secs)?);
    let mut feeds = Vec::with_capacity(config.feeds.urls.len());
    for (i, url) in config.feeds.urls.iter().enumerate() {
        let dump = config.dump_path(i).map(PathBuf::from);
        let mut feed = PodcastFeed::load(url.as_str(), config.feeds.max_age_secs, dump, source.clone())
            .await
            .with_context(|| format!("Failed to load feed {url}"))?;
        feed.set_last_checked_title(state.last_checked_title(url));
        feeds.push(feed);
    }
    let feeds: SharedFeeds = Arc::new(Mutex::new(feeds));

    if cli.once {
        let targets: Vec<Arc<dyn ChatProvider>> = vec![Arc::new(ConsoleChat)];
        let checker = FeedChecker::preview(feeds, Broadcaster::new(targets));
        let announced = checker
            .check_feeds(CheckParams {
                initial_check_age: config.check.initial_check_age_secs as i64,
                max_age: None,
            })
            .await;
        tracing::info!("Single check done, {} new episodes", announced);
        return Ok(());
    }

    let state = Arc::new(Mutex::new(state));

    // 4. Transports
    let mut targets: Vec<Arc<dyn ChatProvider>> = Vec::new();

    let telegram = match &config.services.telegram {
        Some(tg) => {
            let client = Arc::new(TelegramClient::new(tg)?);
            for chat_id in &tg.chat_ids {
                targets.push(Arc::new(TelegramChat::new(client.clone(), chat_id.as_str())));
            }
            Some(client)
        }
        None => None,
    };

    #[cfg(feature = "matrix")]
    let matrix = match &config.services.matrix {
        Some(mx) => {
            let client = infrastructure::matrix::connect(mx).await?;
            for room in &mx.rooms {
                match infrastructure::matrix::MatrixService::for_room(client.clone(), room) {
                    Ok(service) => targets.push(Arc::new(service)),
                    Err(e) => tracing::warn!("Skipping broadcast room: {:#}", e),
                }
            }
            Some(client)
        }
        None => None,
    };

    // 5. Application
    let broadcaster = Broadcaster::new(targets);
    if broadcaster.is_empty() {
        tracing::warn!("No broadcast chats configured, new episodes will only be logged");
    } else {
        tracing::info!("Announcing new episodes to {} chats", broadcaster.len());
    }
    let checker = Arc::new(FeedChecker::new(feeds.clone(), state, broadcaster));
    let tools = ToolRunner::new(&config.tools, &data_dir);
    let router = Arc::new(
        CommandRouter::new(
            feeds,
            tools,
            checker.clone(),
            config.check.clone(),
            config.system.debug,
        )
        .await,
    );

    tokio::spawn(checker.run_periodic(
        Duration::from_secs(config.check.first_delay_secs),
        Duration::from_secs(config.check.interval_secs),
        config.check.initial_check_age_secs as i64,
    ));

    let mut transports = Vec::new();
    if let Some(client) = telegram {
        transports.push(tokio::spawn(TelegramService::new(client).run(router.clone())));
    }
    #[cfg(feature = "matrix")]
    if let Some(client) = matrix {
        let router = router.clone();
        transports.push(tokio::spawn(async move {
            if let Err(e) = infrastructure::matrix::run(client, router).await {
                tracing::error!("{:#}", e);
            }
        }));
    }

    // 6. Wait for shutdown
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("{}", strings::logs::shutdown_fail(&e.to_string()));
            }
        }
        _ = futures::future::join_all(transports) => {
            tracing::warn!("All chat transports stopped");
        }
    }
    tracing::info!("{}", strings::logs::SHUTDOWN);
    Ok(())
}

/// File log (cleared every start) plus stdout, filtered by `RUST_LOG`.
fn init_logging(data_dir: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    if !data_dir.exists() {
        fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    }
    let log_path = data_dir.join("session.log");
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(data_dir, "session.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn,reqwest=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

fn broadcast_target_count(config: &AppConfig) -> usize {
    let telegram = config.services.telegram.as_ref().map_or(0, |tg| tg.chat_ids.len());
    let matrix = if cfg!(feature = "matrix") {
        config.services.matrix.as_ref().map_or(0, |mx| mx.rooms.len())
    } else {
        0
    };
    telegram + matrix
}
