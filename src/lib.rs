//! SMS panel: pairs recipients with commands and dispatches them as SMS.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod llm;
pub mod pairing;
