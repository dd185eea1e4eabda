//! Domain layer
//!
//! Value objects, entities and the interfaces the use cases depend on.
//! Concrete implementations are provided by the infrastructure layer.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{ChatMessage, CodeChange, RoomEvent, RoomSnapshot, RoomUser};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{
    DEFAULT_LANGUAGE, RECENT_MESSAGES_LIMIT, ROOM_MESSAGES_LIMIT, RoomRepository,
};
pub use session::{ConnectionState, Session, SessionData};
pub use value_object::{
    ConnectionId, ConnectionIdFactory, DisplayName, Language, MessageText, RoomId, Timestamp,
};

#[cfg(test)]
pub use repository::MockRoomRepository;
