//! Irori CLI client.
//!
//! Joins a room, mirrors its document, presence and chat, and sends chat
//! lines and document edits typed at the prompt.

pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod mirror;
mod runner;
mod session;
mod ui;

pub use runner::run_client;
