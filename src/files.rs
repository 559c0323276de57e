use crate::chat::model::MessageKind;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum FileStoreError {
	#[error("Failed to store file: {0}")]
	Io(#[from] std::io::Error),
}

/// File storage collaborator: takes raw bytes, hands back a retrievable URL.
/// Attachments are uploaded here out-of-band; only the URL travels through
/// the chat events.
#[async_trait]
pub trait FileStore: Send + Sync {
	async fn put(&self, bytes: &[u8], name: &str) -> Result<String, FileStoreError>;
}

/// Stores uploads on the local disk under a uuid-prefixed name, served back
/// under the public prefix by the HTTP layer.
pub struct DiskFileStore {
	directory: PathBuf,
	public_prefix: String,
}

impl DiskFileStore {
	pub fn new(directory: PathBuf, public_prefix: impl Into<String>) -> Self {
		Self {
			directory,
			public_prefix: public_prefix.into(),
		}
	}
}

#[async_trait]
impl FileStore for DiskFileStore {
	async fn put(&self, bytes: &[u8], name: &str) -> Result<String, FileStoreError> {
		let file_name = format!("{}-{}", Uuid::new_v4(), sanitized_file_name(name));

		tokio::fs::create_dir_all(&self.directory).await?;
		tokio::fs::write(self.directory.join(&file_name), bytes).await?;

		info!(%file_name, size = bytes.len(), "Stored uploaded file");
		Ok(format!("{}/{}", self.public_prefix, file_name))
	}
}

/// Strip anything that could escape the storage directory or break a URL.
fn sanitized_file_name(name: &str) -> String {
	let sanitized: String = name
		.chars()
		.map(|character| {
			if character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_') {
				character
			} else {
				'_'
			}
		})
		.collect();

	if sanitized.trim_matches(['.', '_']).is_empty() {
		"upload".to_string()
	} else {
		sanitized
	}
}

/// Classify an upload for the chat `kind` field based on its file name.
pub fn kind_for_file_name(name: &str) -> MessageKind {
	match mime_guess::from_path(name).first() {
		Some(mime) if mime.type_() == mime_guess::mime::IMAGE => MessageKind::Image,
		_ => MessageKind::Document,
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[tokio::test]
	async fn should_store_bytes_and_return_a_servable_url() {
		let directory = tempfile::tempdir().expect("Failed to create temporary directory");
		let store = DiskFileStore::new(directory.path().to_path_buf(), "/files");

		let url = store.put(b"precious bytes", "offer.pdf").await.expect("Upload failed");

		let file_name = url.strip_prefix("/files/").expect("Unexpected URL prefix");
		let stored = std::fs::read(directory.path().join(file_name)).expect("Stored file not found");
		assert_eq!(b"precious bytes".as_slice(), stored);
		assert!(file_name.ends_with("-offer.pdf"));
	}

	#[tokio::test]
	async fn uploads_with_the_same_name_should_not_collide() {
		let directory = tempfile::tempdir().expect("Failed to create temporary directory");
		let store = DiskFileStore::new(directory.path().to_path_buf(), "/files");

		let first = store.put(b"one", "offer.pdf").await.expect("First upload failed");
		let second = store.put(b"two", "offer.pdf").await.expect("Second upload failed");

		assert_ne!(first, second);
	}

	#[test]
	fn file_names_should_be_sanitized() {
		assert_eq!("offer.pdf", sanitized_file_name("offer.pdf"));
		assert_eq!("_etc_passwd", sanitized_file_name("/etc/passwd"));
		assert_eq!("..__secret", sanitized_file_name("../ secret"));
		assert_eq!("upload", sanitized_file_name("../.."));
		assert_eq!("upload", sanitized_file_name(""));
	}

	#[test]
	fn uploads_should_be_classified_by_file_name() {
		assert_eq!(MessageKind::Image, kind_for_file_name("site.jpg"));
		assert_eq!(MessageKind::Image, kind_for_file_name("floor-plan.png"));
		assert_eq!(MessageKind::Document, kind_for_file_name("offer.pdf"));
		assert_eq!(MessageKind::Document, kind_for_file_name("no_extension"));
	}
}
