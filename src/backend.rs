//! Remote object store capability.

use crate::Result;
use async_trait::async_trait;

/// Blob-level operations of a remote object store container.
///
/// Keys are passed through verbatim; normalization happens in the facade
/// before any call reaches an implementation. Implementations report missing
/// keys as `` `StorageError::NotFound` `` and transient transport failures as
/// `` `StorageError::NetworkError` `` so the retry policy can tell them apart.
///
/// # Examples
///
/// ```rust,no_run
/// use storage_adapter::{ObjectStore, Result};
///
/// async fn example(store: &dyn ObjectStore) -> Result<()> {
///     store.put("reports/summary.txt", b"ok").await?;
///
///     if store.exists("reports/summary.txt").await? {
///         let keys = store.list_by_prefix("reports/").await?;
///         println!("{} objects", keys.len());
///     }
///
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync {
	/// Container (bucket) identifier this store addresses.
	fn container(&self) -> &str;

	/// Download an object.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` if the key doesn't exist.
	async fn get(&self, key: &str) -> Result<Vec<u8>>;

	/// Upload an object, replacing any existing one.
	async fn put(&self, key: &str, content: &[u8]) -> Result<()>;

	/// Delete an object.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` if the key doesn't exist.
	async fn delete(&self, key: &str) -> Result<()>;

	/// Check whether an object exists.
	async fn exists(&self, key: &str) -> Result<bool>;

	/// All keys starting with `prefix`, in no particular order.
	async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>>;

	/// Server-side copy of `src` to `dst`.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` if `src` doesn't exist.
	async fn copy(&self, src: &str, dst: &str) -> Result<()>;
}
