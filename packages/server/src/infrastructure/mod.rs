//! Infrastructure layer
//!
//! - `store`: key-value Room Store (hash/list/string with per-key TTL)
//! - `repository`: RoomRepository implementation over the Room Store
//! - `message_pusher`: WebSocket MessagePusher implementation
//! - `dto`: wire and storage formats

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod store;
