use crate::chat::error::ChatError;
use crate::chat::model::{ChatMessage, MessageKind, RoomId, UserId};
use crate::chat::repository::{MessageStore, NewMessage};
use crate::message::server_event::ServerEvent;
use crate::rfq::RfqDirectory;
use crate::room::dispatcher::BroadcastDispatcher;
use crate::room::receipts::ReadReceiptTracker;
use crate::room::registry::RoomRegistry;
use crate::room::session::Session;
use crate::room::typing::TypingTracker;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The negotiation chat service. Owns the room registry and the trackers and
/// orchestrates every operation of the protocol; the transport layer holds a
/// handle to it and nothing else.
pub struct ChatService {
	registry: Arc<RoomRegistry>,
	dispatcher: BroadcastDispatcher,
	typing: TypingTracker,
	receipts: ReadReceiptTracker,
	store: Arc<dyn MessageStore>,
	directory: Arc<dyn RfqDirectory>,
	room_locks: parking_lot::Mutex<HashMap<RoomId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ChatService {
	pub fn new(store: Arc<dyn MessageStore>, directory: Arc<dyn RfqDirectory>, typing_expiry: Duration) -> Self {
		let registry = Arc::new(RoomRegistry::default());
		let dispatcher = BroadcastDispatcher::new(registry.clone());
		let typing = TypingTracker::new(typing_expiry, dispatcher.clone());
		let receipts = ReadReceiptTracker::new(store.clone(), dispatcher.clone());

		Self {
			registry,
			dispatcher,
			typing,
			receipts,
			store,
			directory,
			room_locks: Default::default(),
		}
	}

	#[cfg(test)]
	pub fn registry(&self) -> &RoomRegistry {
		&self.registry
	}

	/// Join a negotiation room. Validates the user against the RFQ's buyer
	/// and seller, registers a session and returns it together with the
	/// message history hydrating it. As a side effect, messages addressed to
	/// the joining user are flushed as read.
	pub async fn join(
		&self,
		room_id: RoomId,
		user_id: UserId,
		events: mpsc::UnboundedSender<ServerEvent>,
	) -> Result<(Session, Vec<ChatMessage>), ChatError> {
		let participants = self
			.directory
			.participants_of(room_id)
			.await?
			.ok_or(ChatError::Unauthorized)?;
		let peer_id = participants.other(user_id).ok_or(ChatError::Unauthorized)?;

		let session = self.registry.add(room_id, user_id, peer_id, events);

		let history = match self.store.history_for(room_id, user_id).await {
			Ok(history) => history,
			Err(error) => {
				self.registry.remove(&session);
				return Err(error.into());
			}
		};

		// best-effort: a failed flush must not break the join, the client
		// can still mark explicitly once the store recovers
		if let Err(error) = self.receipts.mark_read(room_id, user_id, peer_id).await {
			warn!(%room_id, %user_id, %error, "Failed to flush read receipts on join");
		}

		info!(%room_id, %user_id, session_id = %session.id(), "Session joined negotiation");
		Ok((session, history))
	}

	/// Tear down a session. Safe to call more than once.
	pub fn leave(&self, session: &Session) {
		if self.registry.remove(session) {
			self.typing.clear(session.room_id(), session.user_id());
			info!(
				room_id = %session.room_id(),
				user_id = %session.user_id(),
				session_id = %session.id(),
				"Session left negotiation"
			);
		}
	}

	/// Persist a message and fan it out to every other session in the room.
	/// The message is durable before any broadcast is attempted; persistence
	/// and dispatch are serialized per room so all sessions observe one
	/// room's messages in persisted order.
	pub async fn send_message(
		&self,
		session: &Session,
		body: Option<String>,
		attachments: Vec<String>,
		kind: MessageKind,
	) -> Result<ChatMessage, ChatError> {
		if !self.registry.contains(session) {
			return Err(ChatError::NotConnected);
		}

		let body = body.filter(|body| !body.trim().is_empty());
		if body.is_none() && attachments.is_empty() {
			return Err(ChatError::ValidationFailure(
				"A message needs a body or at least one attachment".to_string(),
			));
		}

		let room_lock = self.room_lock(session.room_id());
		let _ordering_guard = room_lock.lock().await;

		let message = self
			.store
			.create(
				NewMessage::builder()
					.room_id(session.room_id())
					.sender_id(session.user_id())
					.receiver_id(session.peer_id())
					.body(body)
					.attachments(attachments)
					.kind(kind)
					.build(),
			)
			.await?;

		self.dispatcher
			.broadcast_except_session(session.room_id(), session.id(), &message.clone().into());

		Ok(message)
	}

	/// Update the typing indicator for the session's user.
	pub fn set_typing(&self, session: &Session, is_typing: bool) -> Result<(), ChatError> {
		if !self.registry.contains(session) {
			return Err(ChatError::NotConnected);
		}

		self.typing.set_typing(session.room_id(), session.user_id(), is_typing);
		Ok(())
	}

	/// Mark everything the counterpart sent as read.
	pub async fn mark_read(&self, session: &Session) -> Result<(), ChatError> {
		if !self.registry.contains(session) {
			return Err(ChatError::NotConnected);
		}

		self.receipts
			.mark_read(session.room_id(), session.user_id(), session.peer_id())
			.await?;
		Ok(())
	}

	fn room_lock(&self, room_id: RoomId) -> Arc<tokio::sync::Mutex<()>> {
		self.room_locks.lock().entry(room_id).or_default().clone()
	}
}
