//! UseCase layer
//!
//! One use case per protocol operation. Each use case depends only on the
//! domain traits (`RoomRepository`, `MessagePusher`), never on the concrete
//! store or transport.
//!
//! Validation gaps (empty room id, empty message, closed session) are not
//! errors: the use case returns `Outcome::Ignored` and nothing is written or
//! sent.

pub mod change_code;
pub mod connect;
pub mod error;
pub mod join_room;
pub mod leave_rooms;
pub mod request_room_state;
pub mod send_chat;
pub mod snapshot;

pub use change_code::ChangeCodeUseCase;
pub use connect::ConnectUseCase;
pub use error::SessionError;
pub use join_room::JoinRoomUseCase;
pub use leave_rooms::LeaveRoomsUseCase;
pub use request_room_state::RequestRoomStateUseCase;
pub use send_chat::SendChatUseCase;
pub use snapshot::RoomSnapshotQuery;

/// Result of handling one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Validation gap or closed session; nothing was written or sent
    Ignored,
}
