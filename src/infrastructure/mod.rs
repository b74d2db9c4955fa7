//! # Infrastructure Layer
//!
//! Handles interactions with external systems: feed downloads, chat services,
//! and the console tools. Implements the traits defined in the Domain layer.

pub mod console;
pub mod feed_parser;
pub mod http;
#[cfg(feature = "matrix")]
pub mod matrix;
pub mod telegram;
pub mod tools;
