//! Process-wide backend selection.
//!
//! The first successful resolution fixes the backend for the rest of the
//! process. Later calls get the same client back, whatever settings they pass.
//! Concurrent first callers are serialized so exactly one client (and one
//! remote connection) is ever built.
//!
//! The free functions in this module mirror [`StorageClient`] and run against
//! [`instance`], which resolves from the environment on first use.
//!
//! # Examples
//!
//! ```rust,no_run
//! use storage_adapter::{AccessOptions, StorageSettings, global};
//!
//! # async fn example() -> storage_adapter::Result<()> {
//! global::resolve(&StorageSettings::new().with_local_root("/tmp/x"))?;
//!
//! global::write("hello", "notes/a.txt", &AccessOptions::default()).await?;
//! let text = global::read_text("notes/a.txt", &AccessOptions::default()).await?;
//! assert_eq!(text.as_deref(), Some("hello"));
//! # Ok(())
//! # }
//! ```

use parking_lot::RwLock;
use std::sync::Arc;

use crate::client::{AccessOptions, StorageClient};
use crate::codec::{ColumnType, Frame};
use crate::config::{StorageConfig, StorageSettings};
use crate::factory::{self, Connector};
use crate::payload::{DecodedImage, ImageRepr, Payload};
use crate::Result;

static INSTANCE: RwLock<Option<Arc<StorageClient>>> = parking_lot::const_rwlock(None);

/// Resolve the process-wide client, connecting remote containers with
/// [`factory::default_connector`].
///
/// # Errors
///
/// Returns `` `StorageError::ConfigError` `` if a remote container is
/// requested and cannot be connected. Nothing is stored on failure.
pub fn resolve(settings: &StorageSettings) -> Result<Arc<StorageClient>> {
	resolve_with(settings, &factory::default_connector())
}

/// Resolve the process-wide client with a custom remote connector.
///
/// If a client already exists it is returned unchanged and `connector` is
/// never called.
pub fn resolve_with(settings: &StorageSettings, connector: &Connector) -> Result<Arc<StorageClient>> {
	if let Some(client) = INSTANCE.read().as_ref() {
		note_ignored(client, settings);
		return Ok(Arc::clone(client));
	}

	let mut slot = INSTANCE.write();
	if let Some(client) = slot.as_ref() {
		note_ignored(client, settings);
		return Ok(Arc::clone(client));
	}

	let client = Arc::new(StorageClient::from_settings(settings, connector)?);
	let config = client.config();
	tracing::info!(
		backend = %config.backend_kind(),
		root = %config.local_root().display(),
		container = config.remote_container().unwrap_or_default(),
		"Storage mode resolved"
	);
	*slot = Some(Arc::clone(&client));
	Ok(client)
}

fn note_ignored(client: &StorageClient, settings: &StorageSettings) {
	if StorageConfig::resolve(settings) != *client.config() {
		tracing::debug!(
			backend = %client.backend_kind(),
			"Storage already resolved, ignoring new settings"
		);
	}
}

/// The process-wide client, resolving it from
/// [`StorageSettings::from_env`] on first use.
pub fn instance() -> Result<Arc<StorageClient>> {
	if let Some(client) = INSTANCE.read().as_ref() {
		return Ok(Arc::clone(client));
	}
	resolve(&StorageSettings::from_env()?)
}

/// Whether a client has been resolved.
pub fn is_resolved() -> bool {
	INSTANCE.read().is_some()
}

/// Forget the resolved client so the next call resolves again.
///
/// Clients already handed out keep working.
#[doc(hidden)]
pub fn reset() {
	*INSTANCE.write() = None;
}

pub async fn read_image(
	path: &str,
	repr: ImageRepr,
	opts: &AccessOptions,
) -> Result<Option<DecodedImage>> {
	instance()?.read_image(path, repr, opts).await
}

pub async fn read_text(path: &str, opts: &AccessOptions) -> Result<Option<String>> {
	instance()?.read_text(path, opts).await
}

pub async fn read_table(path: &str, opts: &AccessOptions) -> Result<Option<Frame>> {
	instance()?.read_table(path, opts).await
}

pub async fn read_table_with_schema(
	path: &str,
	schema: &[ColumnType],
	opts: &AccessOptions,
) -> Result<Option<Frame>> {
	instance()?.read_table_with_schema(path, schema, opts).await
}

pub async fn read_bytes(path: &str, opts: &AccessOptions) -> Result<Option<Vec<u8>>> {
	instance()?.read_bytes(path, opts).await
}

pub async fn write(payload: impl Into<Payload>, path: &str, opts: &AccessOptions) -> Result<()> {
	instance()?.write(payload, path, opts).await
}

pub async fn exists(path: &str, opts: &AccessOptions) -> Result<bool> {
	instance()?.exists(path, opts).await
}

pub async fn delete(path: &str, opts: &AccessOptions) -> Result<bool> {
	instance()?.delete(path, opts).await
}

pub async fn rename(from: &str, to: &str, opts: &AccessOptions) -> Result<()> {
	instance()?.rename(from, to, opts).await
}

pub async fn list(dir: &str, extension: Option<&str>, opts: &AccessOptions) -> Result<Vec<String>> {
	instance()?.list(dir, extension, opts).await
}

pub async fn list_by_extension(
	dir: &str,
	extension: &str,
	opts: &AccessOptions,
) -> Result<Vec<String>> {
	instance()?.list_by_extension(dir, extension, opts).await
}

pub async fn make_dirs(path: &str, opts: &AccessOptions) -> Result<()> {
	instance()?.make_dirs(path, opts).await
}
