use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, TypedBuilder)]
pub struct ErrorMessage {
	pub code: ErrorCode,
	pub message: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
	Unauthorized,
	PersistenceFailure,
	ValidationFailure,
	NotConnected,
	InvalidFormat,
}
