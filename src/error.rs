use crate::configuration::ConfigurationError;
use crate::database::DatabaseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Failed to open database: {0}")]
	Database(#[from] DatabaseError),
	#[error("IO error while serving requests: {0}")]
	Server(#[from] std::io::Error),
}
