use crate::chat::model::{RoomId, UserId};
use crate::message::server_event::TypingBroadcast;
use crate::room::dispatcher::BroadcastDispatcher;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Per-room, per-user typing state with auto-expiry. Typing events are not
/// delivered reliably, so a started indicator must clear itself: if no
/// refresh or explicit stop arrives within the expiry window, the tracker
/// emits the synthetic "stopped typing" broadcast on the client's behalf.
///
/// Indicators go to the counterpart's sessions only; a user's own tabs never
/// see their own indicator. Nothing here is persisted.
pub struct TypingTracker {
	expiry: Duration,
	dispatcher: BroadcastDispatcher,
	states: Arc<Mutex<HashMap<(RoomId, UserId), u64>>>,
	generations: AtomicU64,
}

impl TypingTracker {
	pub fn new(expiry: Duration, dispatcher: BroadcastDispatcher) -> Self {
		Self {
			expiry,
			dispatcher,
			states: Default::default(),
			generations: AtomicU64::new(0),
		}
	}

	pub fn set_typing(&self, room_id: RoomId, user_id: UserId, is_typing: bool) {
		if is_typing {
			let generation = self.generations.fetch_add(1, Ordering::Relaxed);
			self.states.lock().insert((room_id, user_id), generation);
			self.spawn_expiry(room_id, user_id, generation);
		} else {
			self.states.lock().remove(&(room_id, user_id));
		}

		self.dispatcher
			.broadcast_except_user(room_id, user_id, &TypingBroadcast { user_id, is_typing }.into());
	}

	/// Forget the user's typing state without broadcasting. Called on
	/// disconnect, where the counterpart's indicator is cleared by expiry.
	pub fn clear(&self, room_id: RoomId, user_id: UserId) {
		self.states.lock().remove(&(room_id, user_id));
	}

	fn spawn_expiry(&self, room_id: RoomId, user_id: UserId, generation: u64) {
		let states = self.states.clone();
		let dispatcher = self.dispatcher.clone();
		let expiry = self.expiry;

		tokio::spawn(async move {
			tokio::time::sleep(expiry).await;

			let expired = {
				let mut states = states.lock();
				match states.get(&(room_id, user_id)) {
					// only the newest timer may expire the state
					Some(&current) if current == generation => {
						states.remove(&(room_id, user_id));
						true
					}
					_ => false,
				}
			};

			if expired {
				debug!(%room_id, %user_id, "Typing state expired without explicit stop");
				dispatcher.broadcast_except_user(
					room_id,
					user_id,
					&TypingBroadcast {
						user_id,
						is_typing: false,
					}
					.into(),
				);
			}
		});
	}
}
