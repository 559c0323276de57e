use crate::chat::model::{RoomId, UserId};
use crate::message::server_event::ServerEvent;
use crate::room::session::Session;
use crate::room::session_id::{SessionId, SessionIdSequence};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// In-memory index of the live sessions per negotiation. Holds no durable
/// state; it rebuilds from zero on restart as clients reconnect and rejoin.
#[derive(Default)]
pub struct RoomRegistry {
	inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
	id_sequence: SessionIdSequence,
	rooms: HashMap<RoomId, HashMap<SessionId, Session>>,
}

impl RoomRegistry {
	pub fn add(
		&self,
		room_id: RoomId,
		user_id: UserId,
		peer_id: UserId,
		events: mpsc::UnboundedSender<ServerEvent>,
	) -> Session {
		let mut inner = self.inner.lock();

		let id = inner.id_sequence.next();
		let session = Session::new(id, user_id, room_id, peer_id, events);

		let sessions = inner.rooms.entry(room_id).or_default();
		if sessions.insert(id, session.clone()).is_some() {
			unreachable!("There must never be two sessions with the same id!");
		}

		session
	}

	/// Remove a session. Returns false if it was already gone, making
	/// repeated leave calls a no-op. The room's entry is dropped together
	/// with its last session.
	pub fn remove(&self, session: &Session) -> bool {
		let mut inner = self.inner.lock();

		let Some(sessions) = inner.rooms.get_mut(&session.room_id()) else {
			return false;
		};

		let removed = sessions.remove(&session.id()).is_some();
		if sessions.is_empty() {
			inner.rooms.remove(&session.room_id());
		}

		removed
	}

	pub fn contains(&self, session: &Session) -> bool {
		self.inner
			.lock()
			.rooms
			.get(&session.room_id())
			.is_some_and(|sessions| sessions.contains_key(&session.id()))
	}

	/// All live sessions in the room, optionally excluding one. Ordered by
	/// session id so fan-out is deterministic.
	pub fn sessions_for(&self, room_id: RoomId, excluding: Option<SessionId>) -> Vec<Session> {
		let inner = self.inner.lock();

		let Some(sessions) = inner.rooms.get(&room_id) else {
			return Vec::new();
		};

		let mut sessions: Vec<_> = sessions
			.values()
			.filter(|session| excluding != Some(session.id()))
			.cloned()
			.collect();
		sessions.sort_by_key(Session::id);
		sessions
	}

	#[cfg(test)]
	pub fn room_count(&self) -> usize {
		self.inner.lock().rooms.len()
	}

	#[cfg(test)]
	pub fn session_count(&self, room_id: RoomId) -> usize {
		self.inner.lock().rooms.get(&room_id).map_or(0, HashMap::len)
	}
}
