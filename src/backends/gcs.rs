//! Google Cloud Storage backend implementation.

use async_trait::async_trait;
use cloud_storage::{Client, Error as GcsError, ListRequest};
use futures::StreamExt;

use crate::{ObjectStore, Result, StorageError};

/// Google Cloud Storage bucket.
///
/// Authentication uses Application Default Credentials
/// (`GOOGLE_APPLICATION_CREDENTIALS`, gcloud CLI credentials or the metadata
/// server); credential management is left to the environment.
///
/// # Examples
///
/// ```rust,no_run
/// use storage_adapter::backends::GcsObjectStore;
/// use storage_adapter::ObjectStore;
///
/// # async fn example() -> storage_adapter::Result<()> {
/// let store = GcsObjectStore::new("my-bucket");
/// store.put("reports/summary.txt", b"ok").await?;
/// # Ok(())
/// # }
/// ```
pub struct GcsObjectStore {
	client: Client,
	bucket: String,
}

impl std::fmt::Debug for GcsObjectStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GcsObjectStore")
			.field("bucket", &self.bucket)
			.finish_non_exhaustive()
	}
}

impl GcsObjectStore {
	/// Create a store for `bucket` with default credentials.
	pub fn new(bucket: impl Into<String>) -> Self {
		Self {
			client: Client::default(),
			bucket: bucket.into(),
		}
	}
}

/// Map a client error onto the storage taxonomy.
fn map_error(key: &str, error: GcsError) -> StorageError {
	match error {
		GcsError::Google(response) => match response.error.code {
			404 => StorageError::NotFound(key.to_string()),
			401 | 403 => {
				StorageError::PermissionDenied(format!("{}: {}", key, response.error.message))
			}
			_ => StorageError::NetworkError(format!("{}: {}", key, response.error.message)),
		},
		other => StorageError::NetworkError(format!("{}: {}", key, other)),
	}
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
	fn container(&self) -> &str {
		&self.bucket
	}

	async fn get(&self, key: &str) -> Result<Vec<u8>> {
		self.client
			.object()
			.download(&self.bucket, key)
			.await
			.map_err(|e| map_error(key, e))
	}

	async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
		self.client
			.object()
			.create(
				&self.bucket,
				content.to_vec(),
				key,
				"application/octet-stream",
			)
			.await
			.map(|_| ())
			.map_err(|e| map_error(key, e))
	}

	async fn delete(&self, key: &str) -> Result<()> {
		self.client
			.object()
			.delete(&self.bucket, key)
			.await
			.map_err(|e| map_error(key, e))
	}

	async fn exists(&self, key: &str) -> Result<bool> {
		match self.client.object().read(&self.bucket, key).await {
			Ok(_) => Ok(true),
			Err(e) => match map_error(key, e) {
				StorageError::NotFound(_) => Ok(false),
				other => Err(other),
			},
		}
	}

	async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
		let request = ListRequest {
			prefix: Some(prefix.to_string()),
			..Default::default()
		};
		let pages = self
			.client
			.object()
			.list(&self.bucket, request)
			.await
			.map_err(|e| map_error(prefix, e))?;
		let mut pages = Box::pin(pages);

		let mut keys = Vec::new();
		while let Some(page) = pages.next().await {
			let page = page.map_err(|e| map_error(prefix, e))?;
			keys.extend(page.items.into_iter().map(|object| object.name));
		}
		Ok(keys)
	}

	async fn copy(&self, src: &str, dst: &str) -> Result<()> {
		let source = self
			.client
			.object()
			.read(&self.bucket, src)
			.await
			.map_err(|e| map_error(src, e))?;

		self.client
			.object()
			.copy(&source, &self.bucket, dst)
			.await
			.map(|_| ())
			.map_err(|e| map_error(dst, e))
	}
}
