//! HTTP handlers for the chat relay.

pub mod chat;
pub mod health;

pub use chat::chat;
pub use health::home;
