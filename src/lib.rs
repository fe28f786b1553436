//! # storage-adapter
//!
//! Uniform file access over a local directory tree or a remote object store.
//!
//! Callers address files by logical path. Whether a path lands on disk or in a
//! bucket is decided once per process by the backend selector and can be
//! overridden per call to keep scratch files local in remote mode.
//!
//! ## Features
//!
//! - **Typed payloads**: images, tables, text and raw bytes, each with its own
//!   codec
//! - **Retries**: remote reads and writes retry transient failures with
//!   linear and exponential backoff respectively
//! - **Absent vs. error**: reads of missing files return `Ok(None)`; deletes
//!   of missing files return `Ok(false)`
//! - **Feature Flags**: `gcs` enables the Google Cloud Storage backend
//!
//! ## Example
//!
//! ```rust,no_run
//! use storage_adapter::{AccessOptions, Frame, StorageSettings, Value, global};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // First resolution wins for the rest of the process
//!     global::resolve(&StorageSettings::from_env()?)?;
//!
//!     let opts = AccessOptions::default();
//!     let frame = Frame::from_columns(vec![("a", vec![Value::Int(1), Value::Int(2)])])?;
//!     global::write(frame, "out/t.csv", &opts).await?;
//!
//!     let csv_files = global::list("out", Some(".csv"), &opts).await?;
//!     println!("{:?}", csv_files);
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod backends;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod global;
pub mod path;
pub mod payload;
pub mod retry;

pub use backend::ObjectStore;
pub use client::{AccessOptions, StorageClient};
pub use codec::{Bitmap, ColumnType, Frame, Series, Value};
pub use config::{BackendKind, StorageConfig, StorageSettings};
pub use error::{Result, StorageError};
pub use factory::{Connector, default_connector};
pub use payload::{DecodedImage, ImageRepr, Payload, PayloadKind};
pub use retry::{Backoff, RetryPolicy};
