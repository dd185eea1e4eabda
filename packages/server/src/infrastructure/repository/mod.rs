//! RoomRepository 実装
//!
//! - `store`: Room Store（KVS）上の実装
//! - `keys`: Room ごとのキー名前空間

pub mod keys;
pub mod store;

pub use store::StoreRoomRepository;
