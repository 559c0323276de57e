use crate::chat::model::{MessageKind, RoomId};
use crate::message::{MessageError, WebSocketMessage, deserialize_message_from_str, serialize_message_to_websocket_message};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum ClientRequest {
	Join(JoinRequest),
	Send(SendRequest),
	Typing(TypingRequest),
	MarkRead(MarkReadRequest),
}

impl ClientRequest {
	pub fn kind(&self) -> &'static str {
		match self {
			ClientRequest::Join(_) => "join",
			ClientRequest::Send(_) => "send",
			ClientRequest::Typing(_) => "typing",
			ClientRequest::MarkRead(_) => "mark_read",
		}
	}
}

macro_rules! client_request_from_struct {
	($enum_case: ident, $struct_type: ty) => {
		impl From<$struct_type> for ClientRequest {
			fn from(request: $struct_type) -> ClientRequest {
				ClientRequest::$enum_case(request)
			}
		}
	};
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct JoinRequest {
	pub room_id: RoomId,
}

client_request_from_struct!(Join, JoinRequest);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SendRequest {
	pub room_id: RoomId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub body: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub attachments: Vec<String>,
	pub kind: MessageKind,
}

client_request_from_struct!(Send, SendRequest);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TypingRequest {
	pub room_id: RoomId,
	pub is_typing: bool,
}

client_request_from_struct!(Typing, TypingRequest);

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MarkReadRequest {
	pub room_id: RoomId,
}

client_request_from_struct!(MarkRead, MarkReadRequest);

impl From<&ClientRequest> for WebSocketMessage {
	fn from(request: &ClientRequest) -> Self {
		serialize_message_to_websocket_message(request)
	}
}

impl TryFrom<&str> for ClientRequest {
	type Error = MessageError;

	fn try_from(json: &str) -> Result<Self, Self::Error> {
		deserialize_message_from_str(json)
	}
}

impl TryFrom<&WebSocketMessage> for ClientRequest {
	type Error = MessageError;

	fn try_from(websocket_message: &WebSocketMessage) -> Result<Self, Self::Error> {
		match websocket_message {
			WebSocketMessage::Text(json) => json.as_str().try_into(),
			_ => Err(MessageError::WrongMessageType(websocket_message.clone())),
		}
	}
}
