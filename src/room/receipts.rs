use crate::chat::model::{RoomId, UserId};
use crate::chat::repository::MessageStore;
use crate::database::DatabaseError;
use crate::message::server_event::ReadBroadcast;
use crate::room::dispatcher::BroadcastDispatcher;
use std::sync::Arc;
use tracing::debug;

/// Tracks which messages a participant has read. Reading is a single batch
/// update against the store; the counterpart is notified once per batch and
/// only when something actually changed, so re-marking an already-read room
/// is a complete no-op.
pub struct ReadReceiptTracker {
	store: Arc<dyn MessageStore>,
	dispatcher: BroadcastDispatcher,
}

impl ReadReceiptTracker {
	pub fn new(store: Arc<dyn MessageStore>, dispatcher: BroadcastDispatcher) -> Self {
		Self { store, dispatcher }
	}

	/// Mark all unread messages from `of_sender_id` to `reader_id` as read.
	/// Returns the number of messages that changed state.
	pub async fn mark_read(
		&self,
		room_id: RoomId,
		reader_id: UserId,
		of_sender_id: UserId,
	) -> Result<u64, DatabaseError> {
		let updated = self.store.mark_read(room_id, of_sender_id, reader_id).await?;

		if updated > 0 {
			debug!(%room_id, %reader_id, updated, "Marked messages as read");
			self.dispatcher.broadcast_to_user(
				room_id,
				of_sender_id,
				&ReadBroadcast {
					room_id,
					reader_id,
					of_sender_id,
				}
				.into(),
			);
		}

		Ok(updated)
	}
}
