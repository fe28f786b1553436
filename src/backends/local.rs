//! Local file system backend.

use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

use crate::path::{self, SEPARATOR};
use crate::{Result, StorageError};

/// Rooted directory tree addressed by logical paths.
///
/// Paths handed to this type are already normalized. Leading separators are
/// ignored so every logical path stays under the root; an empty root means
/// the process working directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
	base_path: PathBuf,
}

impl LocalStorage {
	/// Create a local backend rooted at `base_path`.
	///
	/// The root does not need to exist yet; writes create directories on
	/// demand.
	pub fn new(base_path: impl Into<PathBuf>) -> Self {
		Self {
			base_path: base_path.into(),
		}
	}

	pub fn base_path(&self) -> &Path {
		&self.base_path
	}

	/// Get the full file path.
	pub fn get_path(&self, name: &str) -> PathBuf {
		let relative = name.trim_start_matches(SEPARATOR);
		if relative.is_empty() {
			self.base_path.clone()
		} else {
			self.base_path.join(relative)
		}
	}

	pub async fn read(&self, name: &str) -> Result<Vec<u8>> {
		Ok(fs::read(self.get_path(name)).await?)
	}

	/// Write a file, creating missing parent directories first.
	///
	/// The write is not atomic; a crash midway can leave a partial file.
	pub async fn write(&self, name: &str, content: &[u8]) -> Result<()> {
		let path = self.get_path(name);

		// Create parent directories if they don't exist
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).await?;
		}

		fs::write(&path, content).await?;
		Ok(())
	}

	/// Whether a file or directory exists at `name`.
	pub async fn exists(&self, name: &str) -> Result<bool> {
		Ok(fs::try_exists(self.get_path(name)).await?)
	}

	/// Delete a file. Returns `false` if it was already absent.
	pub async fn delete(&self, name: &str) -> Result<bool> {
		match fs::remove_file(self.get_path(name)).await {
			Ok(()) => Ok(true),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
			Err(e) => Err(e.into()),
		}
	}

	/// Rename a file. The destination directory must already exist.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::NotFound` `` only for a missing source. A
	/// missing destination directory is an `` `StorageError::IoError` ``.
	pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
		let source = self.get_path(from);
		if !fs::try_exists(&source).await? {
			return Err(StorageError::NotFound(from.to_string()));
		}

		fs::rename(&source, self.get_path(to))
			.await
			.map_err(|e| match e.kind() {
				std::io::ErrorKind::NotFound => StorageError::IoError(std::io::Error::new(
					e.kind(),
					format!("destination {} is not reachable: {}", to, e),
				)),
				_ => e.into(),
			})
	}

	pub async fn make_dirs(&self, name: &str) -> Result<()> {
		fs::create_dir_all(self.get_path(name)).await?;
		Ok(())
	}

	/// Files directly inside `dir` whose name matches `extension`.
	///
	/// Returns logical paths (`dir/name`). A missing directory lists as
	/// empty.
	pub async fn list_dir(&self, dir: &str, extension: Option<&str>) -> Result<Vec<String>> {
		let mut entries = match fs::read_dir(self.get_path(dir)).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};

		let mut files = Vec::new();
		while let Some(entry) = entries.next_entry().await? {
			if !entry.file_type().await?.is_file() {
				continue;
			}
			let Some(name) = entry.file_name().to_str().map(str::to_string) else {
				continue;
			};
			let logical = path::join(dir, &name);
			if extension.is_none_or(|ext| path::has_extension(&logical, ext)) {
				files.push(logical);
			}
		}

		files.sort();
		Ok(files)
	}

	/// Files anywhere below `dir` whose name matches `extension`.
	pub async fn walk(&self, dir: &str, extension: &str) -> Result<Vec<String>> {
		let root = self.get_path(dir);
		let dir = dir.to_string();
		let extension = extension.to_string();

		tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
			if !root.is_dir() {
				return Ok(Vec::new());
			}

			let mut files = Vec::new();
			for entry in WalkDir::new(&root).follow_links(true) {
				let entry = entry.map_err(|e| StorageError::IoError(e.into()))?;
				if !entry.file_type().is_file() {
					continue;
				}
				let Ok(relative) = entry.path().strip_prefix(&root) else {
					continue;
				};
				let Some(relative) = relative.to_str() else {
					continue;
				};
				let logical = path::join(&dir, &path::normalize(relative));
				if path::has_extension(&logical, &extension) {
					files.push(logical);
				}
			}

			files.sort();
			Ok(files)
		})
		.await
		.map_err(|e| StorageError::IoError(std::io::Error::other(e)))?
	}
}
