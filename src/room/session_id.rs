use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::hash::Hash;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SessionId(u64);

impl From<u64> for SessionId {
	fn from(id: u64) -> Self {
		SessionId(id)
	}
}

impl Display for SessionId {
	fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
		write!(formatter, "SessionId({})", self.0)
	}
}

#[derive(Default)]
pub struct SessionIdSequence {
	next: u64,
}

impl SessionIdSequence {
	pub fn next(&mut self) -> SessionId {
		let id = self.next;
		self.next += 1;
		SessionId(id)
	}
}
