//! In-memory object store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{ObjectStore, Result, StorageError};

/// Object store kept in process memory.
///
/// Behaves like a remote container (flat key space, prefix listing, copy),
/// which makes it the remote of choice for tests and for running remote mode
/// without cloud credentials. Clones share the same objects.
#[derive(Debug, Clone)]
pub struct InMemoryObjectStore {
	container: String,
	objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryObjectStore {
	pub fn new(container: impl Into<String>) -> Self {
		Self {
			container: container.into(),
			objects: Arc::new(RwLock::new(BTreeMap::new())),
		}
	}

	/// Number of stored objects.
	pub fn len(&self) -> usize {
		self.objects.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.read().is_empty()
	}

	/// All keys, sorted.
	pub fn keys(&self) -> Vec<String> {
		self.objects.read().keys().cloned().collect()
	}
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
	fn container(&self) -> &str {
		&self.container
	}

	async fn get(&self, key: &str) -> Result<Vec<u8>> {
		self.objects
			.read()
			.get(key)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(key.to_string()))
	}

	async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
		self.objects
			.write()
			.insert(key.to_string(), content.to_vec());
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<()> {
		self.objects
			.write()
			.remove(key)
			.map(|_| ())
			.ok_or_else(|| StorageError::NotFound(key.to_string()))
	}

	async fn exists(&self, key: &str) -> Result<bool> {
		Ok(self.objects.read().contains_key(key))
	}

	async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
		Ok(self
			.objects
			.read()
			.range(prefix.to_string()..)
			.take_while(|(key, _)| key.starts_with(prefix))
			.map(|(key, _)| key.clone())
			.collect())
	}

	async fn copy(&self, src: &str, dst: &str) -> Result<()> {
		let mut objects = self.objects.write();
		let content = objects
			.get(src)
			.cloned()
			.ok_or_else(|| StorageError::NotFound(src.to_string()))?;
		objects.insert(dst.to_string(), content);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn store() -> InMemoryObjectStore {
		InMemoryObjectStore::new("data")
	}

	#[rstest]
	#[tokio::test]
	async fn test_put_get(store: InMemoryObjectStore) {
		store.put("a/b.txt", b"hello").await.unwrap();

		assert_eq!(store.get("a/b.txt").await.unwrap(), b"hello");
		assert!(store.exists("a/b.txt").await.unwrap());
		assert_eq!(store.container(), "data");
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_key_is_not_found(store: InMemoryObjectStore) {
		assert!(matches!(
			store.get("nope").await,
			Err(StorageError::NotFound(_))
		));
		assert!(matches!(
			store.delete("nope").await,
			Err(StorageError::NotFound(_))
		));
		assert!(matches!(
			store.copy("nope", "other").await,
			Err(StorageError::NotFound(_))
		));
		assert!(!store.exists("nope").await.unwrap());
	}

	#[rstest]
	#[tokio::test]
	async fn test_prefix_listing(store: InMemoryObjectStore) {
		for key in ["out/a.csv", "out/sub/b.csv", "output/c.csv", "other.txt"] {
			store.put(key, b"x").await.unwrap();
		}

		let keys = store.list_by_prefix("out/").await.unwrap();

		assert_eq!(keys, vec!["out/a.csv", "out/sub/b.csv"]);
		assert_eq!(store.list_by_prefix("").await.unwrap().len(), 4);
	}

	#[rstest]
	#[tokio::test]
	async fn test_copy_keeps_source(store: InMemoryObjectStore) {
		store.put("src", b"payload").await.unwrap();

		store.copy("src", "dst").await.unwrap();

		assert_eq!(store.get("dst").await.unwrap(), b"payload");
		assert!(store.exists("src").await.unwrap());
	}

	#[rstest]
	#[tokio::test]
	async fn test_clones_share_objects(store: InMemoryObjectStore) {
		let other = store.clone();
		other.put("k", b"v").await.unwrap();

		assert_eq!(store.len(), 1);
		assert_eq!(store.keys(), vec!["k"]);
	}
}
