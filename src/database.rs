use thiserror::Error;

pub mod sqlite;

#[derive(Error, Debug)]
pub enum DatabaseError {
	#[error("Failed to connect to database: {0}")]
	Connection(#[source] sqlx::Error),
	#[error("Database migration failed: {0}")]
	Migration(#[from] sqlx::migrate::MigrateError),
	#[error("Database query failed: {0}")]
	Query(#[from] sqlx::Error),
	#[error("Invalid persisted value: {0}")]
	InvalidColumn(String),
}
