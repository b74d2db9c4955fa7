//! # Help Command
//!
//! Handles `/help` and `/start`.

use crate::domain::traits::ChatProvider;
use anyhow::Result;

pub async fn handle_help(chat: &impl ChatProvider, minkorrekt: bool, debug: bool) -> Result<()> {
    let mut text = crate::strings::help::MAIN.to_string();
    if minkorrekt {
        text.push_str(crate::strings::help::MINKORREKT);
    }
    if debug {
        text.push_str(crate::strings::help::DEBUG);
    }
    super::reply_text(chat, text.trim_end()).await
}
