use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_newtype {
	($name: ident) => {
		#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			pub fn new() -> Self {
				Self(Uuid::new_v4())
			}

			pub const fn from_uuid(uuid: Uuid) -> Self {
				Self(uuid)
			}
		}

		impl Default for $name {
			fn default() -> Self {
				Self::new()
			}
		}

		impl From<Uuid> for $name {
			fn from(uuid: Uuid) -> Self {
				Self(uuid)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Uuid {
				id.0
			}
		}

		impl Display for $name {
			fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
				write!(formatter, "{}", self.0)
			}
		}
	};
}

uuid_newtype!(RoomId);
uuid_newtype!(UserId);
uuid_newtype!(MessageId);

/// A persisted negotiation message. Immutable once created, except for the
/// one-way `is_read` transition.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChatMessage {
	pub id: MessageId,
	pub room_id: RoomId,
	pub sender_id: UserId,
	pub receiver_id: UserId,
	pub body: Option<String>,
	pub attachments: Vec<String>,
	pub kind: MessageKind,
	pub created_at: DateTime<Utc>,
	pub is_read: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
	Text,
	Image,
	Document,
}

impl MessageKind {
	pub fn as_str(self) -> &'static str {
		match self {
			MessageKind::Text => "text",
			MessageKind::Image => "image",
			MessageKind::Document => "document",
		}
	}
}

impl FromStr for MessageKind {
	type Err = UnknownMessageKind;

	fn from_str(kind: &str) -> Result<Self, Self::Err> {
		match kind {
			"text" => Ok(MessageKind::Text),
			"image" => Ok(MessageKind::Image),
			"document" => Ok(MessageKind::Document),
			unknown => Err(UnknownMessageKind(unknown.to_string())),
		}
	}
}

impl Display for MessageKind {
	fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
		formatter.write_str(self.as_str())
	}
}

#[derive(thiserror::Error, Debug)]
#[error("Unknown message kind: '{0}'")]
pub struct UnknownMessageKind(pub String);
