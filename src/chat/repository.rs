use crate::chat::model::{ChatMessage, MessageId, MessageKind, RoomId, UserId};
use crate::database::DatabaseError;
use async_trait::async_trait;
use typed_builder::TypedBuilder;

/// Everything needed to persist a new message. The store assigns the id,
/// the creation timestamp and the initial `is_read = false`.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct NewMessage {
	pub room_id: RoomId,
	pub sender_id: UserId,
	pub receiver_id: UserId,
	#[builder(default)]
	pub body: Option<String>,
	#[builder(default)]
	pub attachments: Vec<String>,
	pub kind: MessageKind,
}

/// Durable append-only message store. No business logic lives here, callers
/// are responsible for participant validation and broadcast.
#[async_trait]
pub trait MessageStore: Send + Sync {
	async fn create(&self, message: NewMessage) -> Result<ChatMessage, DatabaseError>;

	/// All messages the user sent or received in the room, ordered by
	/// `(created_at, id)` ascending.
	async fn history_for(&self, room_id: RoomId, user_id: UserId) -> Result<Vec<ChatMessage>, DatabaseError>;

	/// Flip `is_read` on every unread message from `sender_id` to
	/// `receiver_id` in the room. Returns the number of affected rows.
	async fn mark_read(&self, room_id: RoomId, sender_id: UserId, receiver_id: UserId) -> Result<u64, DatabaseError>;

	async fn get(&self, id: MessageId) -> Result<Option<ChatMessage>, DatabaseError>;
}
