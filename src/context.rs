use crate::auth::AuthContext;
use crate::chat::service::ChatService;
use crate::configuration::Configuration;
use crate::database::sqlite::SqliteDatabase;
use crate::error::ServerError;
use crate::files::{DiskFileStore, FileStore};
use std::sync::Arc;

/// Everything the transport layer needs, constructed once at startup and
/// passed around by handle. There is no global state.
#[derive(Clone)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub auth: Arc<dyn AuthContext>,
	pub files: Arc<dyn FileStore>,
	pub chat: Arc<ChatService>,
}

impl ApplicationContext {
	pub async fn new(configuration: Configuration) -> Result<ApplicationContext, ServerError> {
		let database = Arc::new(SqliteDatabase::connect(&configuration.database_url).await?);
		let chat = Arc::new(ChatService::new(
			database.clone(),
			database.clone(),
			configuration.typing_expiry,
		));
		let files = Arc::new(DiskFileStore::new(configuration.file_storage_path.clone(), "/files"));

		Ok(Self {
			configuration,
			auth: database,
			files,
			chat,
		})
	}
}
