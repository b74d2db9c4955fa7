//! # Tools Module
//!
//! Wrappers around the external console utilities the bot shells out to.

pub mod executor;

pub use executor::ToolRunner;
