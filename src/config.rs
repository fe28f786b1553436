//! Configuration types for backend selection.

use crate::retry::{Backoff, RetryPolicy};
use crate::{Result, StorageError};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Backend a logical path resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
	/// Local directory tree
	Local,
	/// Remote object store container
	Remote,
}

impl std::fmt::Display for BackendKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			BackendKind::Local => write!(f, "Local"),
			BackendKind::Remote => write!(f, "Remote"),
		}
	}
}

impl FromStr for BackendKind {
	type Err = StorageError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_lowercase().as_str() {
			"local" => Ok(BackendKind::Local),
			"remote" => Ok(BackendKind::Remote),
			_ => Err(StorageError::ConfigError(format!(
				"Invalid backend kind: {}",
				s
			))),
		}
	}
}

/// Caller-supplied parameters for backend resolution.
///
/// Only the settings passed by the first resolution in a process take effect;
/// see [`crate::global::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
	/// Root directory for local mode
	pub local_root: Option<PathBuf>,
	/// Container/bucket identifier; empty or absent selects local mode
	pub remote_container: Option<String>,
	/// Attempts for remote reads
	pub read_attempts: u32,
	/// Attempts for remote writes
	pub write_attempts: u32,
}

impl Default for StorageSettings {
	fn default() -> Self {
		Self {
			local_root: None,
			remote_container: None,
			read_attempts: RetryPolicy::DEFAULT_READ_ATTEMPTS,
			write_attempts: RetryPolicy::DEFAULT_WRITE_ATTEMPTS,
		}
	}
}

impl StorageSettings {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_local_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.local_root = Some(root.into());
		self
	}

	pub fn with_remote_container(mut self, container: impl Into<String>) -> Self {
		self.remote_container = Some(container.into());
		self
	}

	pub fn with_read_attempts(mut self, attempts: u32) -> Self {
		self.read_attempts = attempts;
		self
	}

	pub fn with_write_attempts(mut self, attempts: u32) -> Self {
		self.write_attempts = attempts;
		self
	}

	/// Load settings from environment variables.
	///
	/// # Environment Variables
	///
	/// - `STORAGE_LOCAL_ROOT`: Root directory for local mode (optional)
	/// - `STORAGE_REMOTE_CONTAINER`: Container/bucket name; unset or empty
	///   selects local mode (optional)
	/// - `STORAGE_READ_RETRIES`: Attempts for remote reads (optional, default 3)
	/// - `STORAGE_WRITE_RETRIES`: Attempts for remote writes (optional, default 5)
	///
	/// # Errors
	///
	/// Returns `` `StorageError::ConfigError` `` if a retry count is not a
	/// positive integer.
	pub fn from_env() -> Result<Self> {
		let local_root = env::var("STORAGE_LOCAL_ROOT").ok().map(PathBuf::from);
		let remote_container = env::var("STORAGE_REMOTE_CONTAINER").ok();
		let read_attempts =
			attempts_from_env("STORAGE_READ_RETRIES", RetryPolicy::DEFAULT_READ_ATTEMPTS)?;
		let write_attempts =
			attempts_from_env("STORAGE_WRITE_RETRIES", RetryPolicy::DEFAULT_WRITE_ATTEMPTS)?;

		Ok(Self {
			local_root,
			remote_container,
			read_attempts,
			write_attempts,
		})
	}
}

fn attempts_from_env(var: &str, default: u32) -> Result<u32> {
	match env::var(var) {
		Ok(raw) => match raw.trim().parse::<u32>() {
			Ok(n) if n > 0 => Ok(n),
			_ => Err(StorageError::ConfigError(format!(
				"{} must be a positive integer, got {:?}",
				var, raw
			))),
		},
		Err(_) => Ok(default),
	}
}

/// Resolved storage configuration.
///
/// Immutable once built. `backend_kind` is `Remote` exactly when a non-empty
/// container identifier was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
	backend_kind: BackendKind,
	local_root: PathBuf,
	remote_container: Option<String>,
	read_policy: RetryPolicy,
	write_policy: RetryPolicy,
}

impl StorageConfig {
	/// Resolve settings into a configuration.
	pub fn resolve(settings: &StorageSettings) -> Self {
		let remote_container = settings
			.remote_container
			.as_ref()
			.filter(|container| !container.is_empty())
			.cloned();
		let backend_kind = if remote_container.is_some() {
			BackendKind::Remote
		} else {
			BackendKind::Local
		};

		Self {
			backend_kind,
			local_root: settings.local_root.clone().unwrap_or_default(),
			remote_container,
			read_policy: RetryPolicy::new(settings.read_attempts, Backoff::Linear),
			write_policy: RetryPolicy::new(settings.write_attempts, Backoff::Exponential),
		}
	}

	/// Local-mode configuration rooted at `root`.
	pub fn local(root: impl Into<PathBuf>) -> Self {
		Self::resolve(&StorageSettings::new().with_local_root(root))
	}

	/// Remote-mode configuration for `container`, with `root` for local
	/// override calls.
	pub fn remote(root: impl Into<PathBuf>, container: impl Into<String>) -> Self {
		Self::resolve(
			&StorageSettings::new()
				.with_local_root(root)
				.with_remote_container(container),
		)
	}

	pub fn backend_kind(&self) -> BackendKind {
		self.backend_kind
	}

	pub fn is_remote(&self) -> bool {
		self.backend_kind == BackendKind::Remote
	}

	pub fn local_root(&self) -> &Path {
		&self.local_root
	}

	pub fn remote_container(&self) -> Option<&str> {
		self.remote_container.as_deref()
	}

	/// Retry policy applied to remote reads.
	pub fn read_policy(&self) -> RetryPolicy {
		self.read_policy
	}

	/// Retry policy applied to remote writes, deletes and renames.
	pub fn write_policy(&self) -> RetryPolicy {
		self.write_policy
	}

	/// Shorten every backoff unit. Meant for tests and embedded callers that
	/// cannot afford second-scale sleeps.
	pub fn with_backoff_unit(mut self, unit: std::time::Duration) -> Self {
		self.read_policy = self.read_policy.with_unit(unit);
		self.write_policy = self.write_policy.with_unit(unit);
		self
	}
}
