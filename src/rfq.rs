use crate::chat::model::{RoomId, UserId};
use crate::database::DatabaseError;
use async_trait::async_trait;
#[cfg(test)]
use parking_lot::Mutex;
#[cfg(test)]
use std::collections::HashMap;

/// The two eligible identities of a negotiation room, resolved from the
/// owning RFQ.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Participants {
	pub buyer_id: UserId,
	pub seller_id: UserId,
}

impl Participants {
	/// The counterpart of `user_id`, or None if the user is not a
	/// participant (or the RFQ degenerately names the same user twice).
	pub fn other(&self, user_id: UserId) -> Option<UserId> {
		if user_id == self.buyer_id && user_id != self.seller_id {
			Some(self.seller_id)
		} else if user_id == self.seller_id && user_id != self.buyer_id {
			Some(self.buyer_id)
		} else {
			None
		}
	}
}

/// RFQ collaborator: maps a negotiation room to its buyer and seller.
#[async_trait]
pub trait RfqDirectory: Send + Sync {
	async fn participants_of(&self, room_id: RoomId) -> Result<Option<Participants>, DatabaseError>;
}

/// Directory standing in for the marketplace's RFQ tables in tests.
#[cfg(test)]
#[derive(Default)]
pub struct StaticRfqDirectory {
	rfqs: Mutex<HashMap<RoomId, Participants>>,
}

#[cfg(test)]
impl StaticRfqDirectory {
	pub fn insert(&self, room_id: RoomId, buyer_id: UserId, seller_id: UserId) {
		self.rfqs.lock().insert(room_id, Participants { buyer_id, seller_id });
	}
}

#[cfg(test)]
#[async_trait]
impl RfqDirectory for StaticRfqDirectory {
	async fn participants_of(&self, room_id: RoomId) -> Result<Option<Participants>, DatabaseError> {
		Ok(self.rfqs.lock().get(&room_id).copied())
	}
}
