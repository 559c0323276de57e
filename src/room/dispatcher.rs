use crate::chat::model::{RoomId, UserId};
use crate::message::server_event::ServerEvent;
use crate::room::registry::RoomRegistry;
use crate::room::session::Session;
use crate::room::session_id::SessionId;
use std::sync::Arc;
use tracing::debug;

/// Fans an event out to the sessions of a room. Delivery enqueues onto each
/// session's writer queue without awaiting, so one slow or dead socket never
/// delays the others; failed targets are logged and skipped.
#[derive(Clone)]
pub struct BroadcastDispatcher {
	registry: Arc<RoomRegistry>,
}

impl BroadcastDispatcher {
	pub fn new(registry: Arc<RoomRegistry>) -> Self {
		Self { registry }
	}

	/// Deliver to every session in the room except the originating one.
	/// The sender's other tabs do receive the event.
	pub fn broadcast_except_session(&self, room_id: RoomId, excluded: SessionId, event: &ServerEvent) {
		let sessions = self.registry.sessions_for(room_id, Some(excluded));
		deliver(&sessions, event);
	}

	/// Deliver to every session in the room not owned by the given user.
	pub fn broadcast_except_user(&self, room_id: RoomId, excluded: UserId, event: &ServerEvent) {
		let sessions: Vec<_> = self
			.registry
			.sessions_for(room_id, None)
			.into_iter()
			.filter(|session| session.user_id() != excluded)
			.collect();
		deliver(&sessions, event);
	}

	/// Deliver to every session of one user in the room.
	pub fn broadcast_to_user(&self, room_id: RoomId, target: UserId, event: &ServerEvent) {
		let sessions: Vec<_> = self
			.registry
			.sessions_for(room_id, None)
			.into_iter()
			.filter(|session| session.user_id() == target)
			.collect();
		deliver(&sessions, event);
	}
}

fn deliver(sessions: &[Session], event: &ServerEvent) {
	for session in sessions {
		if session.enqueue(event.clone()).is_err() {
			debug!(session_id = %session.id(), "Dropping broadcast for dead session");
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::message::server_event::TypingBroadcast;
	use tokio::sync::mpsc;
	use tokio::sync::mpsc::UnboundedReceiver;

	struct Fixture {
		registry: Arc<RoomRegistry>,
		dispatcher: BroadcastDispatcher,
		room_id: RoomId,
	}

	impl Fixture {
		fn new() -> Self {
			let registry = Arc::new(RoomRegistry::default());
			let dispatcher = BroadcastDispatcher::new(registry.clone());
			Self {
				registry,
				dispatcher,
				room_id: RoomId::new(),
			}
		}

		fn join(&self, user_id: UserId, peer_id: UserId) -> (Session, UnboundedReceiver<ServerEvent>) {
			let (sender, receiver) = mpsc::unbounded_channel();
			let session = self.registry.add(self.room_id, user_id, peer_id, sender);
			(session, receiver)
		}
	}

	fn typing_event(user_id: UserId) -> ServerEvent {
		TypingBroadcast {
			user_id,
			is_typing: true,
		}
		.into()
	}

	#[tokio::test]
	async fn should_deliver_to_all_sessions_except_the_originating_one() {
		let fixture = Fixture::new();
		let buyer = UserId::new();
		let seller = UserId::new();

		let (origin, mut origin_events) = fixture.join(buyer, seller);
		let (_other_tab, mut other_tab_events) = fixture.join(buyer, seller);
		let (_counterpart, mut counterpart_events) = fixture.join(seller, buyer);

		let event = typing_event(buyer);
		fixture.dispatcher.broadcast_except_session(fixture.room_id, origin.id(), &event);

		assert_eq!(Some(event.clone()), other_tab_events.recv().await);
		assert_eq!(Some(event), counterpart_events.recv().await);
		assert!(origin_events.try_recv().is_err());
	}

	#[tokio::test]
	async fn should_deliver_to_no_session_of_the_excluded_user() {
		let fixture = Fixture::new();
		let buyer = UserId::new();
		let seller = UserId::new();

		let (_first_tab, mut first_tab_events) = fixture.join(buyer, seller);
		let (_second_tab, mut second_tab_events) = fixture.join(buyer, seller);
		let (_counterpart, mut counterpart_events) = fixture.join(seller, buyer);

		let event = typing_event(buyer);
		fixture.dispatcher.broadcast_except_user(fixture.room_id, buyer, &event);

		assert_eq!(Some(event), counterpart_events.recv().await);
		assert!(first_tab_events.try_recv().is_err());
		assert!(second_tab_events.try_recv().is_err());
	}

	#[tokio::test]
	async fn should_deliver_to_every_session_of_the_targeted_user() {
		let fixture = Fixture::new();
		let buyer = UserId::new();
		let seller = UserId::new();

		let (_first_tab, mut first_tab_events) = fixture.join(seller, buyer);
		let (_second_tab, mut second_tab_events) = fixture.join(seller, buyer);
		let (_counterpart, mut counterpart_events) = fixture.join(buyer, seller);

		let event = typing_event(buyer);
		fixture.dispatcher.broadcast_to_user(fixture.room_id, seller, &event);

		assert_eq!(Some(event.clone()), first_tab_events.recv().await);
		assert_eq!(Some(event), second_tab_events.recv().await);
		assert!(counterpart_events.try_recv().is_err());
	}

	#[tokio::test]
	async fn a_dead_session_should_not_prevent_delivery_to_the_others() {
		let fixture = Fixture::new();
		let buyer = UserId::new();
		let seller = UserId::new();

		let (_dead, dead_events) = fixture.join(buyer, seller);
		drop(dead_events);
		let (_live, mut live_events) = fixture.join(seller, buyer);

		let event = typing_event(buyer);
		fixture
			.dispatcher
			.broadcast_except_session(fixture.room_id, SessionId::from(u64::MAX), &event);

		assert_eq!(Some(event), live_events.recv().await);
	}
}
