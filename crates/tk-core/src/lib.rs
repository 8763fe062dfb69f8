//! Core domain + application logic for the thread keeper bot.
//!
//! This crate is framework-agnostic. The chat backend lives behind the
//! `MessagingPort` trait, implemented in adapter crates.

pub mod bot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod lines;
pub mod logging;
pub mod messaging;
pub mod repeater;
pub mod session;
pub mod title_lock;

pub use errors::{Error, Result};
