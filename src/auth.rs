use crate::chat::model::UserId;
use crate::database::DatabaseError;
use async_trait::async_trait;
#[cfg(test)]
use parking_lot::Mutex;
#[cfg(test)]
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
	#[error("Invalid or expired token")]
	InvalidToken,
	#[error("Token lookup failed: {0}")]
	Lookup(#[from] DatabaseError),
}

/// Identity collaborator: resolves a connection's token to a verified user.
/// The marketplace issues the tokens; this service only checks them.
#[async_trait]
pub trait AuthContext: Send + Sync {
	async fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Token map standing in for the marketplace's session store in tests.
#[cfg(test)]
#[derive(Default)]
pub struct StaticTokenAuth {
	tokens: Mutex<HashMap<String, UserId>>,
}

#[cfg(test)]
impl StaticTokenAuth {
	pub fn insert(&self, token: impl Into<String>, user_id: UserId) {
		self.tokens.lock().insert(token.into(), user_id);
	}
}

#[cfg(test)]
#[async_trait]
impl AuthContext for StaticTokenAuth {
	async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
		self.tokens.lock().get(token).copied().ok_or(AuthError::InvalidToken)
	}
}
