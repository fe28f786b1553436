//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Storage operation error.
///
/// Variants fall into three classes:
///
/// - **NotFound**: terminal, never retried. Read paths turn it into an absent
///   result, delete turns it into `Ok(false)`.
/// - **Transient** (`NetworkError`, `IoError`): retried under the remote retry
///   policy and surfaced as `RetriesExhausted` once attempts run out.
/// - **Permanent** (everything else): raised immediately.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The file or object does not exist.
	#[error("Not found: {0}")]
	NotFound(String),

	/// Network or backend failure that may succeed on a later attempt.
	#[error("Network error: {0}")]
	NetworkError(String),

	/// Access to the file or object was denied.
	#[error("Permission denied: {0}")]
	PermissionDenied(String),

	/// Invalid or incomplete configuration.
	#[error("Configuration error: {0}")]
	ConfigError(String),

	/// Payload could not be encoded or decoded.
	#[error("Codec error: {0}")]
	CodecError(String),

	/// Payload shape not supported by the selected codec.
	#[error("Unsupported payload: {0}")]
	UnsupportedPayload(String),

	/// A retryable operation failed on every attempt.
	#[error("{operation} failed after {attempts} attempts: {source}")]
	RetriesExhausted {
		operation: String,
		attempts: u32,
		#[source]
		source: Box<StorageError>,
	},

	/// A remote rename copied the object but could not remove the source.
	///
	/// Both `from` and `to` exist afterwards.
	#[error("Rename of {from} to {to} left the source in place: {source}")]
	RenameIncomplete {
		from: String,
		to: String,
		#[source]
		source: Box<StorageError>,
	},

	/// Local filesystem failure.
	#[error("I/O error: {0}")]
	IoError(io::Error),
}

impl StorageError {
	/// Whether this error means the target does not exist.
	pub fn is_not_found(&self) -> bool {
		match self {
			StorageError::NotFound(_) => true,
			StorageError::RetriesExhausted { source, .. } => source.is_not_found(),
			_ => false,
		}
	}

	/// Whether another attempt of the same operation could succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			StorageError::NetworkError(_) | StorageError::IoError(_)
		)
	}
}

impl From<io::Error> for StorageError {
	fn from(e: io::Error) -> Self {
		match e.kind() {
			io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
			io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(e.to_string()),
			_ => StorageError::IoError(e),
		}
	}
}

impl From<image::ImageError> for StorageError {
	fn from(e: image::ImageError) -> Self {
		StorageError::CodecError(e.to_string())
	}
}

impl From<csv::Error> for StorageError {
	fn from(e: csv::Error) -> Self {
		StorageError::CodecError(e.to_string())
	}
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(io::ErrorKind::NotFound, true, false)]
	#[case(io::ErrorKind::PermissionDenied, false, false)]
	#[case(io::ErrorKind::BrokenPipe, false, true)]
	fn test_io_error_classification(
		#[case] kind: io::ErrorKind,
		#[case] not_found: bool,
		#[case] retryable: bool,
	) {
		let err = StorageError::from(io::Error::new(kind, "boom"));
		assert_eq!(err.is_not_found(), not_found);
		assert_eq!(err.is_retryable(), retryable);
	}

	#[rstest]
	fn test_permission_denied_is_permanent() {
		let err = StorageError::from(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
		assert!(matches!(err, StorageError::PermissionDenied(_)));
		assert!(!err.is_retryable());
	}

	#[rstest]
	fn test_exhausted_display_includes_cause() {
		let err = StorageError::RetriesExhausted {
			operation: "put out/t.csv".to_string(),
			attempts: 5,
			source: Box::new(StorageError::NetworkError("connection reset".to_string())),
		};

		assert_eq!(
			err.to_string(),
			"put out/t.csv failed after 5 attempts: Network error: connection reset"
		);
		assert!(!err.is_retryable());
	}

	#[rstest]
	fn test_codec_errors_are_permanent() {
		let err = StorageError::CodecError("bad header".to_string());
		assert!(!err.is_retryable());
		assert!(!err.is_not_found());
	}
}
