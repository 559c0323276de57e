use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod client_request;
pub mod error_message;
pub mod server_event;

pub type WebSocketMessage = axum::extract::ws::Message;

#[derive(Error, Debug, Clone)]
pub enum MessageError {
	#[error("Failed to deserialize message with error: {error}, message was: {json}")]
	DeserializationFailed { error: String, json: String },
	#[error("Client request has incorrect message type. Message was: {0:?}")]
	WrongMessageType(WebSocketMessage),
}

pub fn serialize_message_to_websocket_message<Message: Serialize>(message: &Message) -> WebSocketMessage {
	let json = serde_json::to_string(message).expect("Failed to serialize message to JSON.");
	WebSocketMessage::Text(json.into())
}

pub fn deserialize_message_from_str<Message: DeserializeOwned>(json: &str) -> Result<Message, MessageError> {
	serde_json::from_str(json).map_err(|error| MessageError::DeserializationFailed {
		error: error.to_string(),
		json: json.to_string(),
	})
}
