//! Storage backend implementations.

#[cfg(feature = "gcs")]
pub mod gcs;
pub mod local;
pub mod memory;

#[cfg(feature = "gcs")]
pub use gcs::GcsObjectStore;
pub use local::LocalStorage;
pub use memory::InMemoryObjectStore;
