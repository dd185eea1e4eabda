//! Collaborative code editing rooms over WebSocket.
//!
//! This library provides the room server: a shared document, presence and
//! chat history per room, synchronized between every connection in the room
//! with last-writer-wins semantics.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
