use crate::auth::{AuthContext, AuthError};
use crate::chat::model::{ChatMessage, MessageId, MessageKind, RoomId, UserId};
use crate::chat::repository::{MessageStore, NewMessage};
use crate::database::DatabaseError;
use crate::rfq::{Participants, RfqDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, migrate, query, query_as};
use std::str::FromStr;
use uuid::Uuid;

/// The persistent side of the service: message store, RFQ directory and
/// token verification, all backed by the marketplace's sqlite database.
#[derive(Clone)]
pub struct SqliteDatabase {
	pool: SqlitePool,
}

impl SqliteDatabase {
	pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
		let options = SqliteConnectOptions::from_str(database_url)
			.map_err(DatabaseError::Connection)?
			.create_if_missing(true);

		// An in-memory database lives and dies with its connection, so the
		// pool must hold on to exactly one.
		let pool_options = if database_url.contains(":memory:") {
			SqlitePoolOptions::new()
				.max_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
		} else {
			SqlitePoolOptions::new()
		};

		let pool = pool_options
			.connect_with(options)
			.await
			.map_err(DatabaseError::Connection)?;
		migrate!().run(&pool).await?;

		Ok(Self { pool })
	}

	/// Register an RFQ so its negotiation room becomes joinable. The
	/// marketplace application owns this table; this entry point exists for
	/// seeding and tests.
	pub async fn insert_rfq(&self, room_id: RoomId, buyer_id: UserId, seller_id: UserId) -> Result<(), DatabaseError> {
		query("INSERT INTO rfq (uuid, buyer_uuid, seller_uuid) VALUES (?1, ?2, ?3)")
			.bind(Uuid::from(room_id))
			.bind(Uuid::from(buyer_id))
			.bind(Uuid::from(seller_id))
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	pub async fn insert_auth_token(
		&self,
		token: &str,
		user_id: UserId,
		expires_at: Option<DateTime<Utc>>,
	) -> Result<(), DatabaseError> {
		query("INSERT INTO auth_token (token, user_uuid, expires_at) VALUES (?1, ?2, ?3)")
			.bind(token)
			.bind(Uuid::from(user_id))
			.bind(expires_at.map(|timestamp| timestamp.timestamp_micros()))
			.execute(&self.pool)
			.await?;
		Ok(())
	}
}

#[derive(FromRow)]
struct ChatMessageRow {
	uuid: Uuid,
	room_uuid: Uuid,
	sender_uuid: Uuid,
	receiver_uuid: Uuid,
	body: Option<String>,
	attachments: String,
	kind: String,
	is_read: bool,
	created_at: i64,
}

impl TryFrom<ChatMessageRow> for ChatMessage {
	type Error = DatabaseError;

	fn try_from(row: ChatMessageRow) -> Result<Self, DatabaseError> {
		let kind = row
			.kind
			.parse::<MessageKind>()
			.map_err(|error| DatabaseError::InvalidColumn(error.to_string()))?;
		let attachments: Vec<String> = serde_json::from_str(&row.attachments)
			.map_err(|error| DatabaseError::InvalidColumn(format!("attachments: {error}")))?;
		let created_at = DateTime::from_timestamp_micros(row.created_at)
			.ok_or_else(|| DatabaseError::InvalidColumn(format!("created_at: {}", row.created_at)))?;

		Ok(ChatMessage {
			id: MessageId::from(row.uuid),
			room_id: RoomId::from(row.room_uuid),
			sender_id: UserId::from(row.sender_uuid),
			receiver_id: UserId::from(row.receiver_uuid),
			body: row.body,
			attachments,
			kind,
			created_at,
			is_read: row.is_read,
		})
	}
}

const CHAT_MESSAGE_COLUMNS: &str = "uuid, room_uuid, sender_uuid, receiver_uuid, body, attachments, kind, is_read, created_at";

#[async_trait]
impl MessageStore for SqliteDatabase {
	async fn create(&self, message: NewMessage) -> Result<ChatMessage, DatabaseError> {
		let id = MessageId::new();
		let created_at = Utc::now();
		let attachments_json =
			serde_json::to_string(&message.attachments).expect("Failed to serialize attachments to JSON.");

		query(
			r"
			INSERT INTO chat_message (uuid, room_uuid, sender_uuid, receiver_uuid, body, attachments, kind, is_read, created_at)
			VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
			",
		)
		.bind(Uuid::from(id))
		.bind(Uuid::from(message.room_id))
		.bind(Uuid::from(message.sender_id))
		.bind(Uuid::from(message.receiver_id))
		.bind(message.body.as_deref())
		.bind(attachments_json)
		.bind(message.kind.as_str())
		.bind(created_at.timestamp_micros())
		.execute(&self.pool)
		.await?;

		// sub-second precision would get lost round-tripping through the column
		let created_at = DateTime::from_timestamp_micros(created_at.timestamp_micros())
			.unwrap_or_else(|| unreachable!("timestamp round-trip cannot overflow"));

		Ok(ChatMessage {
			id,
			room_id: message.room_id,
			sender_id: message.sender_id,
			receiver_id: message.receiver_id,
			body: message.body,
			attachments: message.attachments,
			kind: message.kind,
			created_at,
			is_read: false,
		})
	}

	async fn history_for(&self, room_id: RoomId, user_id: UserId) -> Result<Vec<ChatMessage>, DatabaseError> {
		let rows: Vec<ChatMessageRow> = query_as(&format!(
			r"
			SELECT {CHAT_MESSAGE_COLUMNS}
			FROM chat_message
			WHERE room_uuid = ?1 AND (sender_uuid = ?2 OR receiver_uuid = ?2)
			ORDER BY created_at, uuid
			"
		))
		.bind(Uuid::from(room_id))
		.bind(Uuid::from(user_id))
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(ChatMessage::try_from).collect()
	}

	async fn mark_read(&self, room_id: RoomId, sender_id: UserId, receiver_id: UserId) -> Result<u64, DatabaseError> {
		let result = query(
			r"
			UPDATE chat_message
			SET is_read = 1
			WHERE room_uuid = ?1 AND sender_uuid = ?2 AND receiver_uuid = ?3 AND is_read = 0
			",
		)
		.bind(Uuid::from(room_id))
		.bind(Uuid::from(sender_id))
		.bind(Uuid::from(receiver_id))
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected())
	}

	async fn get(&self, id: MessageId) -> Result<Option<ChatMessage>, DatabaseError> {
		let row: Option<ChatMessageRow> = query_as(&format!(
			"SELECT {CHAT_MESSAGE_COLUMNS} FROM chat_message WHERE uuid = ?1"
		))
		.bind(Uuid::from(id))
		.fetch_optional(&self.pool)
		.await?;

		row.map(ChatMessage::try_from).transpose()
	}
}

#[async_trait]
impl RfqDirectory for SqliteDatabase {
	async fn participants_of(&self, room_id: RoomId) -> Result<Option<Participants>, DatabaseError> {
		let row: Option<(Uuid, Uuid)> = query_as("SELECT buyer_uuid, seller_uuid FROM rfq WHERE uuid = ?1")
			.bind(Uuid::from(room_id))
			.fetch_optional(&self.pool)
			.await?;

		Ok(row.map(|(buyer_uuid, seller_uuid)| Participants {
			buyer_id: UserId::from(buyer_uuid),
			seller_id: UserId::from(seller_uuid),
		}))
	}
}

#[async_trait]
impl AuthContext for SqliteDatabase {
	async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
		let row: Option<(Uuid, Option<i64>)> = query_as("SELECT user_uuid, expires_at FROM auth_token WHERE token = ?1")
			.bind(token)
			.fetch_optional(&self.pool)
			.await
			.map_err(DatabaseError::from)?;

		let (user_uuid, expires_at) = row.ok_or(AuthError::InvalidToken)?;

		if let Some(expires_at) = expires_at {
			if expires_at <= Utc::now().timestamp_micros() {
				return Err(AuthError::InvalidToken);
			}
		}

		Ok(UserId::from(user_uuid))
	}
}
