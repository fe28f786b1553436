//! Storage facade dispatching logical paths to the local or remote backend.

use std::path::PathBuf;
use std::sync::Arc;

use crate::backends::LocalStorage;
use crate::codec::{self, ColumnType, Frame, RasterCodec, TableCodec, TextCodec};
use crate::config::{BackendKind, StorageConfig, StorageSettings};
use crate::factory::Connector;
use crate::path;
use crate::payload::{DecodedImage, ImageRepr, Payload};
use crate::retry::RetryPolicy;
use crate::{ObjectStore, Result, StorageError};

/// Per-call options.
///
/// # Examples
///
/// ```
/// use storage_adapter::AccessOptions;
///
/// // Scratch files stay on disk even when the client is remote
/// let scratch = AccessOptions::local();
/// assert!(scratch.local);
///
/// let patient = AccessOptions::default().with_max_retries(8);
/// assert_eq!(patient.max_retries, Some(8));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessOptions {
	/// Force the local backend for this call, whatever the resolved mode.
	pub local: bool,
	/// Attempt ceiling overriding the configured profile.
	pub max_retries: Option<u32>,
}

impl AccessOptions {
	/// Options forcing the local backend.
	pub fn local() -> Self {
		Self {
			local: true,
			max_retries: None,
		}
	}

	pub fn with_local(mut self, local: bool) -> Self {
		self.local = local;
		self
	}

	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = Some(max_retries);
		self
	}
}

/// Backend a single call runs against.
#[derive(Clone, Copy)]
enum Target<'a> {
	Local(&'a LocalStorage),
	Remote(&'a dyn ObjectStore),
}

/// Uniform access to files on disk or objects in a remote container.
///
/// Every operation normalizes its paths, picks the backend from the resolved
/// configuration and the per-call [`AccessOptions`], and wraps remote calls in
/// the configured retry profile. Local calls run once.
///
/// # Examples
///
/// ```rust,no_run
/// use storage_adapter::{AccessOptions, Frame, StorageClient, Value};
///
/// # async fn example() -> storage_adapter::Result<()> {
/// let client = StorageClient::local("/tmp/x");
/// let opts = AccessOptions::default();
///
/// let frame = Frame::from_columns(vec![("a", vec![Value::Int(1), Value::Int(2)])])?;
/// client.write(frame.clone(), "out/t.csv", &opts).await?;
///
/// assert_eq!(client.read_table("out/t.csv", &opts).await?, Some(frame));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StorageClient {
	config: StorageConfig,
	local: LocalStorage,
	remote: Option<Arc<dyn ObjectStore>>,
}

impl std::fmt::Debug for StorageClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StorageClient")
			.field("config", &self.config)
			.field("remote", &self.remote.as_ref().map(|store| store.container()))
			.finish()
	}
}

impl StorageClient {
	/// Create a client from a resolved configuration.
	///
	/// `remote` is required when the configuration is remote and ignored
	/// otherwise.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::ConfigError` `` if the configuration is remote
	/// and no store was supplied.
	pub fn new(config: StorageConfig, remote: Option<Arc<dyn ObjectStore>>) -> Result<Self> {
		let remote = match config.backend_kind() {
			BackendKind::Local => None,
			BackendKind::Remote => Some(remote.ok_or_else(|| {
				StorageError::ConfigError(format!(
					"Remote container {:?} configured without an object store",
					config.remote_container().unwrap_or_default()
				))
			})?),
		};

		Ok(Self {
			local: LocalStorage::new(config.local_root()),
			config,
			remote,
		})
	}

	/// Local-mode client rooted at `root`.
	pub fn local(root: impl Into<PathBuf>) -> Self {
		let config = StorageConfig::local(root);
		Self {
			local: LocalStorage::new(config.local_root()),
			config,
			remote: None,
		}
	}

	/// Remote-mode client on `store`, with `root` serving local-override calls.
	///
	/// A store with an empty container name yields a local-mode client.
	pub fn remote(root: impl Into<PathBuf>, store: Arc<dyn ObjectStore>) -> Self {
		let config = StorageConfig::remote(root, store.container());
		Self {
			local: LocalStorage::new(config.local_root()),
			remote: config.is_remote().then_some(store),
			config,
		}
	}

	/// Resolve `settings` and connect the remote store if one is configured.
	///
	/// `connector` runs at most once, and only for remote configurations.
	pub fn from_settings(settings: &StorageSettings, connector: &Connector) -> Result<Self> {
		let config = StorageConfig::resolve(settings);
		let remote = match config.remote_container() {
			Some(container) => Some(connector(container)?),
			None => None,
		};
		Self::new(config, remote)
	}

	/// Replace the resolved configuration's backoff unit.
	pub fn with_backoff_unit(mut self, unit: std::time::Duration) -> Self {
		self.config = self.config.with_backoff_unit(unit);
		self
	}

	pub fn config(&self) -> &StorageConfig {
		&self.config
	}

	pub fn backend_kind(&self) -> BackendKind {
		self.config.backend_kind()
	}

	pub fn local_storage(&self) -> &LocalStorage {
		&self.local
	}

	/// Remote store, if the client is in remote mode.
	pub fn remote_store(&self) -> Option<&Arc<dyn ObjectStore>> {
		self.remote.as_ref()
	}

	fn target(&self, opts: &AccessOptions) -> Target<'_> {
		match &self.remote {
			Some(store) if !opts.local => Target::Remote(store.as_ref()),
			_ => Target::Local(&self.local),
		}
	}

	fn read_policy(&self, opts: &AccessOptions) -> RetryPolicy {
		let policy = self.config.read_policy();
		opts.max_retries
			.map_or(policy, |attempts| policy.with_max_attempts(attempts))
	}

	fn write_policy(&self, opts: &AccessOptions) -> RetryPolicy {
		let policy = self.config.write_policy();
		opts.max_retries
			.map_or(policy, |attempts| policy.with_max_attempts(attempts))
	}

	/// Fetch raw bytes, mapping "missing" and exhausted remote reads to `None`.
	///
	/// With `strict_local`, a missing local file is an error instead.
	async fn fetch(
		&self,
		key: &str,
		opts: &AccessOptions,
		strict_local: bool,
	) -> Result<Option<Vec<u8>>> {
		match self.target(opts) {
			Target::Local(local) => match local.read(key).await {
				Ok(bytes) => Ok(Some(bytes)),
				Err(e) if e.is_not_found() && !strict_local => {
					tracing::warn!(path = key, "File not found");
					Ok(None)
				}
				Err(e) => Err(report("read", key, e)),
			},
			Target::Remote(store) => {
				let result = self
					.read_policy(opts)
					.run(&format!("get {}", key), move || store.get(key))
					.await;
				match result {
					Ok(bytes) => Ok(Some(bytes)),
					Err(e) if e.is_not_found() => {
						tracing::warn!(
							container = store.container(),
							key,
							"Object not found"
						);
						Ok(None)
					}
					Err(e @ StorageError::RetriesExhausted { .. }) => {
						tracing::error!(
							container = store.container(),
							key,
							error = %e,
							"Object unreachable, reporting as absent"
						);
						Ok(None)
					}
					Err(e) => Err(report("get", key, e)),
				}
			}
		}
	}

	/// Read and decode an image.
	///
	/// Returns `Ok(None)` if the file is missing or the remote store stayed
	/// unreachable for every attempt.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::CodecError` `` if the bytes are not a
	/// supported raster format, or any permanent backend error.
	pub async fn read_image(
		&self,
		path: &str,
		repr: ImageRepr,
		opts: &AccessOptions,
	) -> Result<Option<DecodedImage>> {
		let key = path::normalize(path);
		let Some(bytes) = self.fetch(&key, opts, false).await? else {
			return Ok(None);
		};
		RasterCodec
			.decode_as(&bytes, repr)
			.map(Some)
			.map_err(|e| report("decode image", &key, e))
	}

	/// Read a UTF-8 text file.
	pub async fn read_text(&self, path: &str, opts: &AccessOptions) -> Result<Option<String>> {
		let key = path::normalize(path);
		let Some(bytes) = self.fetch(&key, opts, false).await? else {
			return Ok(None);
		};
		TextCodec
			.decode_text(bytes)
			.map(Some)
			.map_err(|e| report("decode text", &key, e))
	}

	pub async fn read_bytes(&self, path: &str, opts: &AccessOptions) -> Result<Option<Vec<u8>>> {
		let key = path::normalize(path);
		self.fetch(&key, opts, false).await
	}

	/// Read a delimited table with a header row.
	///
	/// Unlike the other reads, a missing *local* file is an error.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` for a missing local file and
	/// `` `StorageError::CodecError` `` for malformed content.
	pub async fn read_table(&self, path: &str, opts: &AccessOptions) -> Result<Option<Frame>> {
		let key = path::normalize(path);
		let Some(bytes) = self.fetch(&key, opts, true).await? else {
			return Ok(None);
		};
		TableCodec
			.decode_frame(&bytes)
			.map(Some)
			.map_err(|e| report("decode table", &key, e))
	}

	/// Read a table whose column types are known.
	///
	/// Text columns holding digits or "True" stay text. Missing files behave
	/// as in [`StorageClient::read_table`].
	pub async fn read_table_with_schema(
		&self,
		path: &str,
		schema: &[ColumnType],
		opts: &AccessOptions,
	) -> Result<Option<Frame>> {
		let key = path::normalize(path);
		let Some(bytes) = self.fetch(&key, opts, true).await? else {
			return Ok(None);
		};
		TableCodec
			.decode_frame_with_schema(&bytes, schema)
			.map(Some)
			.map_err(|e| report("decode table", &key, e))
	}

	/// Encode `payload` by variant and store it at `path`.
	///
	/// Image objects are converted to bitmaps first. Local images are encoded
	/// in the format named by the path's extension (PNG if unknown); remote
	/// images are always PNG. Local writes create missing parent directories.
	///
	/// # Errors
	///
	/// Remote writes return `` `StorageError::RetriesExhausted` `` once the
	/// write profile runs out; a failed write is never reported as success.
	pub async fn write(
		&self,
		payload: impl Into<Payload>,
		path: &str,
		opts: &AccessOptions,
	) -> Result<()> {
		let key = path::normalize(path);
		let payload = payload.into().into_bitmap_form();
		let target = self.target(opts);

		let encoded = match (&payload, target) {
			(Payload::Bitmap(bitmap), Target::Local(_)) => {
				RasterCodec.encode_bitmap(bitmap, RasterCodec::format_for_path(&key))
			}
			_ => codec::encode(&payload),
		};
		let bytes = encoded.map_err(|e| report("encode", &key, e))?;

		match target {
			Target::Local(local) => local
				.write(&key, &bytes)
				.await
				.map_err(|e| report("write", &key, e)),
			Target::Remote(store) => {
				let content = bytes.as_slice();
				let key = key.as_str();
				self.write_policy(opts)
					.run(&format!("put {}", key), move || store.put(key, content))
					.await
					.map_err(|e| report("put", key, e))
			}
		}
	}

	/// Whether `path` exists.
	pub async fn exists(&self, path: &str, opts: &AccessOptions) -> Result<bool> {
		let key = path::normalize(path);
		match self.target(opts) {
			Target::Local(local) => local
				.exists(&key)
				.await
				.map_err(|e| report("exists", &key, e)),
			Target::Remote(store) => {
				let key = key.as_str();
				match self
					.read_policy(opts)
					.run(&format!("exists {}", key), move || store.exists(key))
					.await
				{
					Err(e) if e.is_not_found() => Ok(false),
					result => result.map_err(|e| report("exists", key, e)),
				}
			}
		}
	}

	/// Delete `path`.
	///
	/// Deleting something that does not exist succeeds and returns `false`.
	pub async fn delete(&self, path: &str, opts: &AccessOptions) -> Result<bool> {
		let key = path::normalize(path);
		let result = match self.target(opts) {
			Target::Local(local) => local.delete(&key).await,
			Target::Remote(store) => {
				let key = key.as_str();
				match self
					.write_policy(opts)
					.run(&format!("delete {}", key), move || store.delete(key))
					.await
				{
					Ok(()) => Ok(true),
					Err(e) if e.is_not_found() => Ok(false),
					Err(e) => Err(e),
				}
			}
		};

		match result {
			Ok(false) => {
				tracing::info!(path = %key, "Nothing to delete");
				Ok(false)
			}
			Ok(true) => Ok(true),
			Err(e) => Err(report("delete", &key, e)),
		}
	}

	/// Move `from` to `to`.
	///
	/// Remote stores have no rename, so the object is copied and the source
	/// deleted afterwards. The source is never deleted unless the copy
	/// succeeded.
	///
	/// # Errors
	///
	/// - `` `StorageError::NotFound` `` if `from` does not exist
	/// - `` `StorageError::RenameIncomplete` `` if the copy succeeded but the
	///   source could not be removed; both objects exist afterwards
	/// - Locally, a missing destination directory surfaces as an I/O error
	pub async fn rename(&self, from: &str, to: &str, opts: &AccessOptions) -> Result<()> {
		let from = path::normalize(from);
		let to = path::normalize(to);

		match self.target(opts) {
			Target::Local(local) => local
				.rename(&from, &to)
				.await
				.map_err(|e| report("rename", &from, e)),
			Target::Remote(store) => {
				let policy = self.write_policy(opts);
				let (src, dst) = (from.as_str(), to.as_str());

				// Same key after normalization: copy then delete would drop it
				if src == dst {
					let found = self
						.read_policy(opts)
						.run(&format!("exists {}", src), move || store.exists(src))
						.await
						.map_err(|e| report("rename", src, e))?;
					if !found {
						return Err(report(
							"rename",
							src,
							StorageError::NotFound(src.to_string()),
						));
					}
					return Ok(());
				}

				policy
					.run(&format!("copy {} to {}", src, dst), move || {
						store.copy(src, dst)
					})
					.await
					.map_err(|e| report("copy", src, e))?;

				match policy
					.run(&format!("delete {}", src), move || store.delete(src))
					.await
				{
					Ok(()) => Ok(()),
					Err(e) if e.is_not_found() => Ok(()),
					Err(e) => Err(report(
						"rename",
						src,
						StorageError::RenameIncomplete {
							from: from.clone(),
							to: to.clone(),
							source: Box::new(e),
						},
					)),
				}
			}
		}
	}

	/// Files under `dir`, optionally filtered by extension.
	///
	/// Locally only the immediate directory is listed. Remote listing matches
	/// every key under the `dir/` prefix. Results are sorted logical paths.
	pub async fn list(
		&self,
		dir: &str,
		extension: Option<&str>,
		opts: &AccessOptions,
	) -> Result<Vec<String>> {
		let dir = path::normalize(dir);
		match self.target(opts) {
			Target::Local(local) => local
				.list_dir(&dir, extension)
				.await
				.map_err(|e| report("list", &dir, e)),
			Target::Remote(store) => self.list_remote(store, &dir, extension, opts).await,
		}
	}

	/// Files anywhere below `dir` with the given extension.
	pub async fn list_by_extension(
		&self,
		dir: &str,
		extension: &str,
		opts: &AccessOptions,
	) -> Result<Vec<String>> {
		let dir = path::normalize(dir);
		match self.target(opts) {
			Target::Local(local) => local
				.walk(&dir, extension)
				.await
				.map_err(|e| report("list", &dir, e)),
			Target::Remote(store) => self.list_remote(store, &dir, Some(extension), opts).await,
		}
	}

	async fn list_remote(
		&self,
		store: &dyn ObjectStore,
		dir: &str,
		extension: Option<&str>,
		opts: &AccessOptions,
	) -> Result<Vec<String>> {
		let prefix = path::normalize_prefix(dir);
		let prefix = prefix.as_str();
		let keys = self
			.read_policy(opts)
			.run(&format!("list {}", prefix), move || {
				store.list_by_prefix(prefix)
			})
			.await
			.map_err(|e| report("list", dir, e))?;

		let mut matches: Vec<String> = keys
			.into_iter()
			.filter(|key| extension.is_none_or(|ext| path::has_extension(key, ext)))
			.collect();
		matches.sort();
		Ok(matches)
	}

	/// Create `path` and its parents.
	///
	/// Remote containers have no directories, so this does nothing there.
	pub async fn make_dirs(&self, path: &str, opts: &AccessOptions) -> Result<()> {
		let dir = path::normalize(path);
		match self.target(opts) {
			Target::Local(local) => local
				.make_dirs(&dir)
				.await
				.map_err(|e| report("make_dirs", &dir, e)),
			Target::Remote(store) => {
				tracing::debug!(
					container = store.container(),
					path = %dir,
					"Skipping make_dirs on remote store"
				);
				Ok(())
			}
		}
	}
}

/// Log a failure before it reaches the caller.
fn report(operation: &str, path: &str, error: StorageError) -> StorageError {
	tracing::error!(operation, path, error = %error, "Storage operation failed");
	error
}
