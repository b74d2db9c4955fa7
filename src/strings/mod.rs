//! # Strings Module
//!
//! Centralizes user-facing strings, help text, and recurring log lines.
//! All chat text is German, raw (unescaped); handlers escape it for the chat markup.

pub mod help;
pub mod logs;
pub mod messages;
