//! Construction of remote object stores.

use crate::{ObjectStore, Result, StorageError};
use std::sync::Arc;

/// Builds the remote store for a container identifier.
///
/// Called at most once per resolution, while the selector lock is held.
pub type Connector = Arc<dyn Fn(&str) -> Result<Arc<dyn ObjectStore>> + Send + Sync>;

/// Connector for the remote backend compiled into this build.
///
/// With the `gcs` feature the container names a Google Cloud Storage bucket.
/// Without it, resolving a remote container is a configuration error; use
/// [`connector`] to supply a store explicitly.
///
/// # Examples
///
/// ```rust,no_run
/// use storage_adapter::factory::default_connector;
///
/// let connect = default_connector();
/// let store = connect("my-bucket");
/// ```
pub fn default_connector() -> Connector {
	Arc::new(create_remote)
}

/// Connector that ignores the container and hands out `store`.
pub fn connector(store: Arc<dyn ObjectStore>) -> Connector {
	Arc::new(move |_container: &str| Ok(Arc::clone(&store)))
}

/// Create the remote store for `container`.
pub fn create_remote(container: &str) -> Result<Arc<dyn ObjectStore>> {
	#[cfg(feature = "gcs")]
	{
		Ok(Arc::new(crate::backends::GcsObjectStore::new(container)))
	}
	#[cfg(not(feature = "gcs"))]
	{
		Err(StorageError::ConfigError(format!(
			"Remote container {:?} requested but no remote backend is enabled",
			container
		)))
	}
}
