//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes the feed cache, new-episode checks, command routing and state.

pub mod broadcast;
pub mod feed;
pub mod input;
pub mod router;
pub mod scheduler;
pub mod search;
pub mod state;
pub mod topics;
