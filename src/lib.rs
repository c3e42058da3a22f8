//! # Contact Intake Telegram Bot
//!
//! A Telegram bot that asks users for their name and email address,
//! validates the email, and appends each finished submission to a
//! spreadsheet file.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod image_format;
pub mod intake;
pub mod localization;
pub mod storage;
pub mod validation;
