use crate::chat::model::{ChatMessage, RoomId, UserId};
use crate::message::error_message::ErrorMessage;
use crate::message::{MessageError, WebSocketMessage, serialize_message_to_websocket_message};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ServerEvent {
	History(HistoryEvent),
	Message(ChatMessage),
	Typing(TypingBroadcast),
	Read(ReadBroadcast),
	Error(ErrorMessage),
}

macro_rules! server_event_from_struct {
	($enum_case: ident, $struct_type: ty) => {
		impl From<$struct_type> for ServerEvent {
			fn from(event: $struct_type) -> ServerEvent {
				ServerEvent::$enum_case(event)
			}
		}
	};
}

/// Sent exactly once after a successful join, hydrating the new session.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct HistoryEvent {
	pub room_id: RoomId,
	pub messages: Vec<ChatMessage>,
}

server_event_from_struct!(History, HistoryEvent);
server_event_from_struct!(Message, ChatMessage);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TypingBroadcast {
	pub user_id: UserId,
	pub is_typing: bool,
}

server_event_from_struct!(Typing, TypingBroadcast);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ReadBroadcast {
	pub room_id: RoomId,
	pub reader_id: UserId,
	pub of_sender_id: UserId,
}

server_event_from_struct!(Read, ReadBroadcast);
server_event_from_struct!(Error, ErrorMessage);

impl From<&ServerEvent> for WebSocketMessage {
	fn from(event: &ServerEvent) -> Self {
		serialize_message_to_websocket_message(event)
	}
}

impl TryFrom<&WebSocketMessage> for ServerEvent {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, MessageError> {
		match websocket_message {
			WebSocketMessage::Text(json) => crate::message::deserialize_message_from_str(json.as_str()),
			_ => Err(MessageError::WrongMessageType(websocket_message.clone())),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::chat::model::{MessageId, MessageKind};
	use crate::message::error_message::ErrorCode;
	use chrono::{TimeZone, Utc};
	use uuid::uuid;

	const ROOM: RoomId = RoomId::from_uuid(uuid!("6fa8c571-0e73-4d5b-b8a5-8d60a0efbbc9"));
	const BUYER: UserId = UserId::from_uuid(uuid!("89f683a3-4410-4a4a-a1c8-0a9a2710a384"));
	const SELLER: UserId = UserId::from_uuid(uuid!("e02f0056-8dd4-44b4-84e1-a1e21b8f8f15"));

	fn example_message() -> ChatMessage {
		ChatMessage {
			id: MessageId::from_uuid(uuid!("34d833b2-2b8c-4c5a-bd96-0e0859f0a4b7")),
			room_id: ROOM,
			sender_id: BUYER,
			receiver_id: SELLER,
			body: Some("50000?".to_string()),
			attachments: vec![],
			kind: MessageKind::Text,
			created_at: Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
			is_read: false,
		}
	}

	#[test]
	fn message_event_should_serialize_and_deserialize() {
		let message_event = ServerEvent::Message(example_message());
		let json = serde_json::to_string(&message_event).expect("Failed to serialize Message event to JSON");
		assert_eq!(
			r#"{"type":"message","id":"34d833b2-2b8c-4c5a-bd96-0e0859f0a4b7","room_id":"6fa8c571-0e73-4d5b-b8a5-8d60a0efbbc9","sender_id":"89f683a3-4410-4a4a-a1c8-0a9a2710a384","receiver_id":"e02f0056-8dd4-44b4-84e1-a1e21b8f8f15","body":"50000?","attachments":[],"kind":"text","created_at":"2026-08-07T12:00:00Z","is_read":false}"#,
			json
		);

		let deserialized_message_event: ServerEvent =
			serde_json::from_str(&json).expect("Failed to deserialize Message event from JSON");
		assert_eq!(message_event, deserialized_message_event);
	}

	#[test]
	fn history_event_should_serialize_and_deserialize() {
		let history_event = ServerEvent::History(HistoryEvent {
			room_id: ROOM,
			messages: vec![example_message()],
		});
		let json = serde_json::to_string(&history_event).expect("Failed to serialize History event to JSON");

		let deserialized_history_event: ServerEvent =
			serde_json::from_str(&json).expect("Failed to deserialize History event from JSON");
		assert_eq!(history_event, deserialized_history_event);
	}

	#[test]
	fn empty_history_event_should_serialize_with_an_empty_list() {
		let history_event = ServerEvent::History(HistoryEvent {
			room_id: ROOM,
			messages: vec![],
		});
		let json = serde_json::to_string(&history_event).expect("Failed to serialize History event to JSON");
		assert_eq!(
			r#"{"type":"history","room_id":"6fa8c571-0e73-4d5b-b8a5-8d60a0efbbc9","messages":[]}"#,
			json
		);
	}

	#[test]
	fn typing_broadcast_should_serialize_and_deserialize() {
		let typing_event = ServerEvent::Typing(TypingBroadcast {
			user_id: BUYER,
			is_typing: true,
		});
		let json = serde_json::to_string(&typing_event).expect("Failed to serialize Typing broadcast to JSON");
		assert_eq!(
			r#"{"type":"typing","user_id":"89f683a3-4410-4a4a-a1c8-0a9a2710a384","is_typing":true}"#,
			json
		);

		let deserialized_typing_event: ServerEvent =
			serde_json::from_str(&json).expect("Failed to deserialize Typing broadcast from JSON");
		assert_eq!(typing_event, deserialized_typing_event);
	}

	#[test]
	fn read_broadcast_should_serialize_and_deserialize() {
		let read_event = ServerEvent::Read(ReadBroadcast {
			room_id: ROOM,
			reader_id: SELLER,
			of_sender_id: BUYER,
		});
		let json = serde_json::to_string(&read_event).expect("Failed to serialize Read broadcast to JSON");
		assert_eq!(
			r#"{"type":"read","room_id":"6fa8c571-0e73-4d5b-b8a5-8d60a0efbbc9","reader_id":"e02f0056-8dd4-44b4-84e1-a1e21b8f8f15","of_sender_id":"89f683a3-4410-4a4a-a1c8-0a9a2710a384"}"#,
			json
		);

		let deserialized_read_event: ServerEvent =
			serde_json::from_str(&json).expect("Failed to deserialize Read broadcast from JSON");
		assert_eq!(read_event, deserialized_read_event);
	}

	#[test]
	fn error_event_should_serialize_and_deserialize() {
		let error_event = ServerEvent::Error(
			ErrorMessage::builder()
				.code(ErrorCode::Unauthorized)
				.message("User is not a participant of this negotiation".to_string())
				.build(),
		);
		let json = serde_json::to_string(&error_event).expect("Failed to serialize Error event to JSON");
		assert_eq!(
			r#"{"type":"error","code":"unauthorized","message":"User is not a participant of this negotiation"}"#,
			json
		);

		let deserialized_error_event: ServerEvent =
			serde_json::from_str(&json).expect("Failed to deserialize Error event from JSON");
		assert_eq!(error_event, deserialized_error_event);
	}
}
