use crate::database::DatabaseError;
use crate::message::error_message::{ErrorCode, ErrorMessage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
	#[error("User is not a participant of this negotiation")]
	Unauthorized,
	#[error("Failed to persist: {0}")]
	PersistenceFailure(#[from] DatabaseError),
	#[error("{0}")]
	ValidationFailure(String),
	#[error("No live session for this negotiation")]
	NotConnected,
}

impl ChatError {
	pub fn code(&self) -> ErrorCode {
		match self {
			ChatError::Unauthorized => ErrorCode::Unauthorized,
			ChatError::PersistenceFailure(_) => ErrorCode::PersistenceFailure,
			ChatError::ValidationFailure(_) => ErrorCode::ValidationFailure,
			ChatError::NotConnected => ErrorCode::NotConnected,
		}
	}
}

impl From<ChatError> for ErrorMessage {
	fn from(error: ChatError) -> Self {
		ErrorMessage::builder().code(error.code()).message(error.to_string()).build()
	}
}
