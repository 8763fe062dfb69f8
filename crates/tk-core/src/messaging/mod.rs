//! Backend-neutral messaging abstractions (Telegram today).

pub mod port;
pub mod types;
