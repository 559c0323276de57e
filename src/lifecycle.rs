use crate::chat::model::UserId;
use crate::chat::service::ChatService;
use crate::connection::receiver::MessageReceiver;
use crate::connection::sender::MessageSender;
use crate::message::client_request::{ClientRequest, JoinRequest, MarkReadRequest, SendRequest, TypingRequest};
use crate::message::error_message::{ErrorCode, ErrorMessage};
use crate::message::server_event::{HistoryEvent, ServerEvent};
use crate::room::session::Session;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Inbound requests per connection; generous enough for typing refreshes
/// plus messages, tight enough to stop a misbehaving client.
const QUOTA: Quota = Quota::per_second(nonzero!(10u32)).allow_burst(nonzero!(30u32));

/// Drive one authenticated connection from join to disconnect.
pub async fn run_session(
	chat: Arc<ChatService>,
	user_id: UserId,
	message_sender: MessageSender,
	message_receiver: MessageReceiver,
) {
	let Some((session, events, message_receiver)) =
		join_room(&chat, user_id, &message_sender, message_receiver).await
	else {
		return;
	};

	// The writer loop runs as its own task so that a dying socket never
	// cancels a request that is mid-persistence; a message accepted for
	// persistence completes even if the sender is already gone.
	let forwarder = tokio::spawn(forward_events(events, message_sender.clone()));

	handle_messages(&chat, &session, message_receiver, message_sender).await;

	chat.leave(&session);
	drop(session);
	// with the last queue handle gone the forwarder drains and exits
	let _ = forwarder.await;
}

/// First protocol phase: wait for a valid `join`. Anything else is answered
/// with an error and the connection keeps waiting; a rejected join may be
/// retried with another room.
async fn join_room(
	chat: &ChatService,
	user_id: UserId,
	message_sender: &MessageSender,
	mut message_receiver: MessageReceiver,
) -> Option<(Session, mpsc::UnboundedReceiver<ServerEvent>, MessageReceiver)> {
	loop {
		let request = message_receiver.receive().await?;

		let JoinRequest { room_id } = match request {
			ClientRequest::Join(join_request) => join_request,
			other => {
				debug!(kind = other.kind(), %user_id, "Request before join");
				let error = ErrorMessage::builder()
					.code(ErrorCode::NotConnected)
					.message("Join a negotiation before sending other events".to_string())
					.build();
				let _ = message_sender.send_event(error.into()).await;
				continue;
			}
		};

		let (events_sender, events) = mpsc::unbounded_channel();
		match chat.join(room_id, user_id, events_sender).await {
			Ok((session, messages)) => {
				let history = HistoryEvent { room_id, messages };
				if message_sender.send_event(history.into()).await.is_err() {
					chat.leave(&session);
					return None;
				}
				return Some((session, events, message_receiver));
			}
			Err(error) => {
				warn!(%room_id, %user_id, %error, "Join rejected");
				let _ = message_sender.send_event(ErrorMessage::from(error).into()).await;
			}
		}
	}
}

/// Drain the session's broadcast queue into the socket until either end
/// goes away.
async fn forward_events(mut events: mpsc::UnboundedReceiver<ServerEvent>, message_sender: MessageSender) {
	while let Some(event) = events.recv().await {
		if message_sender.send_event(event).await.is_err() {
			break;
		}
	}
}

async fn handle_messages(
	chat: &ChatService,
	session: &Session,
	mut message_receiver: MessageReceiver,
	message_sender: MessageSender,
) {
	let rate_limiter = RateLimiter::direct(QUOTA);
	loop {
		let Some(request) = message_receiver.receive().await else {
			info!(session_id = %session.id(), "Connection closed");
			break;
		};

		rate_limiter.until_ready().await;

		debug!(
			kind = request.kind(),
			session_id = %session.id(),
			user_id = %session.user_id(),
			"Received request"
		);

		if let Err(error_message) = handle_request(chat, session, request).await {
			let _ = message_sender.send_event(error_message.into()).await;
		}
	}
}

async fn handle_request(chat: &ChatService, session: &Session, request: ClientRequest) -> Result<(), ErrorMessage> {
	use ClientRequest::*;
	match request {
		Join(join_request) => handle_repeated_join_request(session, join_request),
		Send(send_request) => handle_send_request(chat, session, send_request).await,
		Typing(typing_request) => handle_typing_request(chat, session, typing_request),
		MarkRead(mark_read_request) => handle_mark_read_request(chat, session, mark_read_request).await,
	}
}

fn handle_repeated_join_request(session: &Session, JoinRequest { room_id }: JoinRequest) -> Result<(), ErrorMessage> {
	if room_id == session.room_id() {
		// already joined, nothing to do and no second history
		return Ok(());
	}

	Err(ErrorMessage::builder()
		.code(ErrorCode::ValidationFailure)
		.message("This connection is already bound to another negotiation".to_string())
		.build())
}

async fn handle_send_request(
	chat: &ChatService,
	session: &Session,
	SendRequest {
		room_id,
		body,
		attachments,
		kind,
	}: SendRequest,
) -> Result<(), ErrorMessage> {
	if room_id != session.room_id() {
		return Err(not_joined_error());
	}

	// no success acknowledgement: the sending client keeps optimistic local
	// state and recovers through history replay if in doubt
	chat.send_message(session, body, attachments, kind)
		.await
		.map(drop)
		.map_err(Into::into)
}

fn handle_typing_request(
	chat: &ChatService,
	session: &Session,
	TypingRequest { room_id, is_typing }: TypingRequest,
) -> Result<(), ErrorMessage> {
	if room_id != session.room_id() {
		return Err(not_joined_error());
	}

	if let Err(error) = chat.set_typing(session, is_typing) {
		warn!(session_id = %session.id(), %error, "Dropped typing update");
	}
	Ok(())
}

async fn handle_mark_read_request(
	chat: &ChatService,
	session: &Session,
	MarkReadRequest { room_id }: MarkReadRequest,
) -> Result<(), ErrorMessage> {
	if room_id != session.room_id() {
		return Err(not_joined_error());
	}

	if let Err(error) = chat.mark_read(session).await {
		warn!(session_id = %session.id(), %error, "Dropped read receipt update");
	}
	Ok(())
}

fn not_joined_error() -> ErrorMessage {
	ErrorMessage::builder()
		.code(ErrorCode::NotConnected)
		.message("This connection has not joined that negotiation".to_string())
		.build()
}
