//! # Debug Command
//!
//! `/debugNewEpisode [seconds]` runs a feed check right away and announces
//! every latest episode younger than the given age.

use crate::application::input::numeric_arg;
use crate::application::scheduler::{CheckParams, FeedChecker};
use crate::domain::config::CheckConfig;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;
use anyhow::Result;
use std::sync::Arc;

pub async fn handle_debug_check(
    checker: &Arc<FeedChecker>,
    check: &CheckConfig,
    chat: &impl ChatProvider,
    text: &str,
) -> Result<()> {
    let max_age = numeric_arg(text).unwrap_or(check.debug_max_age_secs as i64);
    let params = CheckParams {
        initial_check_age: check.initial_check_age_secs as i64,
        max_age: Some(max_age),
    };

    // The check locks the feeds and may take a while; run it detached.
    let checker = checker.clone();
    tokio::spawn(async move {
        let announced = checker.check_feeds(params).await;
        tracing::info!("Debug check announced {} episodes", announced);
    });

    super::reply_text(chat, &messages::debug_check_started(max_age)).await
}
