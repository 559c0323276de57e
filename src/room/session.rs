use crate::chat::model::{RoomId, UserId};
use crate::message::server_event::ServerEvent;
use crate::room::session_id::SessionId;
use tokio::sync::mpsc;

/// One live connection bound to a user and a room. A user may hold several
/// concurrent sessions (browser tabs); each carries its own event queue and
/// receives broadcasts independently. Never persisted.
#[derive(Clone, Debug)]
pub struct Session {
	id: SessionId,
	user_id: UserId,
	room_id: RoomId,
	peer_id: UserId,
	events: mpsc::UnboundedSender<ServerEvent>,
}

impl Session {
	pub fn new(
		id: SessionId,
		user_id: UserId,
		room_id: RoomId,
		peer_id: UserId,
		events: mpsc::UnboundedSender<ServerEvent>,
	) -> Self {
		Self {
			id,
			user_id,
			room_id,
			peer_id,
			events,
		}
	}

	pub fn id(&self) -> SessionId {
		self.id
	}

	pub fn user_id(&self) -> UserId {
		self.user_id
	}

	pub fn room_id(&self) -> RoomId {
		self.room_id
	}

	/// The other participant of the negotiation, resolved at join time.
	pub fn peer_id(&self) -> UserId {
		self.peer_id
	}

	/// Queue an event for delivery without blocking. Fails only if the
	/// session's writer loop has already terminated.
	pub fn enqueue(&self, event: ServerEvent) -> Result<(), ()> {
		self.events.send(event).map_err(|_| ())
	}
}
