//! Sticker Bot Core Library
//!
//! This library provides the core functionality for a Telegram bot that
//! turns a sticker pack link into a zip archive of the pack's stickers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Sticker pack link extraction
//! - [`resolver`] - Sticker set lookup and fetch batch construction
//! - [`download`] - Sequential sticker download with retry
//! - [`progress`] - Throttled status-message progress reporting
//! - [`archive`] - Zip archive creation
//! - [`delivery`] - Archive upload, per-request workspace and per-pack locking
//! - [`bot`] - Message routing, the pack request pipeline and update polling
//! - [`telegram`] - The chat platform boundary and its Bot API client
//! - [`config`] - Credentials and runtime settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod bot;
pub mod config;
pub mod delivery;
pub mod download;
pub mod parser;
pub mod progress;
pub mod resolver;
pub mod telegram;
mod user_agent;

// Re-export commonly used types
pub use archive::{ArchiveError, ArchiveResult};
pub use bot::{PackHandler, PackOutcome, PackRequest, PipelineError};
pub use config::{BotSettings, ConfigError, Credentials};
pub use download::{FetchReport, RetryPolicy, fetch_all};
pub use parser::{PackIdentifier, extract_pack_id};
pub use resolver::{FetchBatch, Resolution, resolve};
pub use telegram::{ApiError, BotApiClient, ChatApi, ChatId};
