//! Test fixtures for storage facade tests.
//!
//! Shared by the integration test binaries through `mod fixtures;`.

#![allow(dead_code)]
#![allow(unreachable_pub)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rstest::fixture;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use storage_adapter::backends::InMemoryObjectStore;
use storage_adapter::{ObjectStore, Result, StorageClient, StorageError};
use tempfile::TempDir;

// ============================================================================
// Instrumented remote store
// ============================================================================

/// Remote operation, for counting calls and injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
	Get,
	Put,
	Delete,
	Exists,
	List,
	Copy,
}

/// In-memory store that records every call and can fail on demand.
///
/// Injected failures are `NetworkError`s, i.e. transient, and are raised
/// before the wrapped store is touched.
#[derive(Debug)]
pub struct FaultyStore {
	inner: InMemoryObjectStore,
	calls: Mutex<HashMap<Op, u32>>,
	// Remaining failures per operation; `None` fails forever
	faults: Mutex<HashMap<Op, Option<u32>>>,
}

impl FaultyStore {
	pub fn new(container: &str) -> Self {
		Self {
			inner: InMemoryObjectStore::new(container),
			calls: Mutex::new(HashMap::new()),
			faults: Mutex::new(HashMap::new()),
		}
	}

	/// Make `op` fail on every call.
	pub fn fail_always(&self, op: Op) {
		self.faults.lock().insert(op, None);
	}

	/// Make the next `times` calls of `op` fail.
	pub fn fail_times(&self, op: Op, times: u32) {
		self.faults.lock().insert(op, Some(times));
	}

	pub fn calls(&self, op: Op) -> u32 {
		self.calls.lock().get(&op).copied().unwrap_or(0)
	}

	pub fn total_calls(&self) -> u32 {
		self.calls.lock().values().sum()
	}

	/// Underlying objects, bypassing call counting and faults.
	pub fn inner(&self) -> &InMemoryObjectStore {
		&self.inner
	}

	fn enter(&self, op: Op, key: &str) -> Result<()> {
		*self.calls.lock().entry(op).or_insert(0) += 1;

		let mut faults = self.faults.lock();
		match faults.get_mut(&op) {
			Some(None) => Err(StorageError::NetworkError(format!("{:?} {} refused", op, key))),
			Some(Some(remaining)) if *remaining > 0 => {
				*remaining -= 1;
				Err(StorageError::NetworkError(format!("{:?} {} timed out", op, key)))
			}
			_ => Ok(()),
		}
	}
}

#[async_trait]
impl ObjectStore for FaultyStore {
	fn container(&self) -> &str {
		self.inner.container()
	}

	async fn get(&self, key: &str) -> Result<Vec<u8>> {
		self.enter(Op::Get, key)?;
		self.inner.get(key).await
	}

	async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
		self.enter(Op::Put, key)?;
		self.inner.put(key, content).await
	}

	async fn delete(&self, key: &str) -> Result<()> {
		self.enter(Op::Delete, key)?;
		self.inner.delete(key).await
	}

	async fn exists(&self, key: &str) -> Result<bool> {
		self.enter(Op::Exists, key)?;
		self.inner.exists(key).await
	}

	async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
		self.enter(Op::List, prefix)?;
		self.inner.list_by_prefix(prefix).await
	}

	async fn copy(&self, src: &str, dst: &str) -> Result<()> {
		self.enter(Op::Copy, src)?;
		self.inner.copy(src, dst).await
	}
}

// ============================================================================
// Client fixtures
// ============================================================================

/// Local-mode client rooted in a temporary directory.
pub struct LocalEnv {
	pub dir: TempDir,
	pub client: StorageClient,
}

/// Remote-mode client on a [`FaultyStore`] named "data", with a temporary
/// local root for override calls.
pub struct RemoteEnv {
	pub dir: TempDir,
	pub store: Arc<FaultyStore>,
	pub client: StorageClient,
}

#[fixture]
pub fn temp_dir() -> TempDir {
	TempDir::new().expect("Failed to create temp dir")
}

#[fixture]
pub fn local_env(temp_dir: TempDir) -> LocalEnv {
	let client = StorageClient::local(temp_dir.path());
	LocalEnv {
		dir: temp_dir,
		client,
	}
}

/// Remote env with second-scale backoff; use with paused time.
#[fixture]
pub fn remote_env(temp_dir: TempDir) -> RemoteEnv {
	let store = Arc::new(FaultyStore::new("data"));
	let client = StorageClient::remote(temp_dir.path(), store.clone());
	RemoteEnv {
		dir: temp_dir,
		store,
		client,
	}
}

/// Remote env without backoff sleeps.
#[fixture]
pub fn fast_remote_env(remote_env: RemoteEnv) -> RemoteEnv {
	RemoteEnv {
		client: remote_env.client.with_backoff_unit(Duration::ZERO),
		..remote_env
	}
}
