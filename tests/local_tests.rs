//! Integration tests for the facade in local mode.

mod fixtures;

use fixtures::{LocalEnv, local_env};
use rstest::rstest;
use storage_adapter::{AccessOptions, Bitmap, DecodedImage, Frame, ImageRepr, StorageError, Value};

// ============================================================================
// Rename
// ============================================================================

mod rename_tests {
	use super::*;

	#[rstest]
	#[tokio::test]
	async fn test_rename_within_directory(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();
		client.write(vec![9u8; 4], "a/old.bin", &opts).await.unwrap();

		client.rename("a/old.bin", "a/new.bin", &opts).await.unwrap();

		assert!(client.exists("a/new.bin", &opts).await.unwrap());
		assert!(!client.exists("a/old.bin", &opts).await.unwrap());
		assert_eq!(
			client.read_bytes("a/new.bin", &opts).await.unwrap(),
			Some(vec![9u8; 4])
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_rename_into_missing_directory_fails(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();
		client.write(vec![1u8], "a/old.bin", &opts).await.unwrap();

		let result = client.rename("a/old.bin", "b/new.bin", &opts).await;

		match result {
			Err(e @ StorageError::IoError(_)) => assert!(!e.is_not_found()),
			other => panic!("expected an I/O error, got {:?}", other),
		}
		assert!(client.exists("a/old.bin", &opts).await.unwrap());
		assert!(!client.exists("b/new.bin", &opts).await.unwrap());
	}

	#[rstest]
	#[tokio::test]
	async fn test_rename_missing_source(local_env: LocalEnv) {
		let result = local_env
			.client
			.rename("a/none.bin", "a/new.bin", &AccessOptions::default())
			.await;

		assert!(matches!(result, Err(StorageError::NotFound(_))));
	}
}

// ============================================================================
// Reads and writes
// ============================================================================

mod read_write_tests {
	use super::*;

	#[rstest]
	#[tokio::test]
	async fn test_missing_reads_are_absent(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();

		assert_eq!(client.read_text("nope.txt", &opts).await.unwrap(), None);
		assert_eq!(client.read_bytes("nope.bin", &opts).await.unwrap(), None);
		assert_eq!(
			client
				.read_image("nope.png", ImageRepr::Object, &opts)
				.await
				.unwrap(),
			None
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_table_is_an_error(local_env: LocalEnv) {
		let result = local_env
			.client
			.read_table("nope.csv", &AccessOptions::default())
			.await;

		assert!(matches!(result, Err(StorageError::NotFound(_))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_table_round_trip_with_mixed_columns(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();
		let frame = Frame::from_columns(vec![
			("id", vec![Value::Int(1), Value::Int(2)]),
			("score", vec![Value::Float(0.5), Value::Null]),
			("ok", vec![Value::Bool(true), Value::Bool(false)]),
			("name", vec![Value::from("a, b"), Value::from("c")]),
		])
		.unwrap();

		client.write(frame.clone(), "tables/mixed.csv", &opts).await.unwrap();

		assert_eq!(
			client.read_table("tables/mixed.csv", &opts).await.unwrap(),
			Some(frame)
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_write_creates_parents(local_env: LocalEnv) {
		local_env
			.client
			.write("x", "deep/er/still/f.txt", &AccessOptions::default())
			.await
			.unwrap();

		assert!(local_env.dir.path().join("deep/er/still/f.txt").is_file());
	}

	#[rstest]
	#[tokio::test]
	async fn test_display_values_written_as_text(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();

		client
			.write(storage_adapter::Payload::text(42), "n.txt", &opts)
			.await
			.unwrap();

		assert_eq!(
			client.read_text("n.txt", &opts).await.unwrap().as_deref(),
			Some("42")
		);
	}

	#[rstest]
	#[case("img/a.png")]
	#[case("img/a.bmp")]
	#[case("img/a.tiff")]
	#[tokio::test]
	async fn test_lossless_formats_are_pixel_exact(local_env: LocalEnv, #[case] path: &str) {
		let client = &local_env.client;
		let opts = AccessOptions::default();
		let bitmap = Bitmap::new(3, 1, 3, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]).unwrap();

		client.write(bitmap.clone(), path, &opts).await.unwrap();

		assert_eq!(
			client
				.read_image(path, ImageRepr::Bitmap, &opts)
				.await
				.unwrap(),
			Some(DecodedImage::Bitmap(bitmap))
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_corrupt_image_is_an_error(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();
		client.write("not pixels", "img/bad.png", &opts).await.unwrap();

		let result = client.read_image("img/bad.png", ImageRepr::Bitmap, &opts).await;

		assert!(matches!(result, Err(StorageError::CodecError(_))));
	}
}

// ============================================================================
// Delete, list, make_dirs
// ============================================================================

mod tree_tests {
	use super::*;

	#[rstest]
	#[tokio::test]
	async fn test_delete_twice(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();
		client.write("x", "d.txt", &opts).await.unwrap();

		assert!(client.delete("d.txt", &opts).await.unwrap());
		assert!(!client.delete("d.txt", &opts).await.unwrap());
		assert!(!client.delete("never.txt", &opts).await.unwrap());
	}

	#[rstest]
	#[tokio::test]
	async fn test_list_is_shallow_list_by_extension_recurses(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();
		for path in ["out/a.csv", "out/b.txt", "out/sub/c.csv", "out/sub/deeper/d.CSV"] {
			client.write("x", path, &opts).await.unwrap();
		}

		assert_eq!(
			client.list("out/", Some(".csv"), &opts).await.unwrap(),
			vec!["out/a.csv"]
		);
		assert_eq!(
			client.list("out", None, &opts).await.unwrap(),
			vec!["out/a.csv", "out/b.txt"]
		);
		assert_eq!(
			client.list_by_extension("out", "csv", &opts).await.unwrap(),
			vec!["out/a.csv", "out/sub/c.csv", "out/sub/deeper/d.CSV"]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_list_missing_directory_is_empty(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();

		assert!(client.list("ghost", None, &opts).await.unwrap().is_empty());
		assert!(
			client
				.list_by_extension("ghost", "csv", &opts)
				.await
				.unwrap()
				.is_empty()
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_make_dirs(local_env: LocalEnv) {
		let client = &local_env.client;
		let opts = AccessOptions::default();

		client.make_dirs("x//y/z/", &opts).await.unwrap();
		client.make_dirs("x/y/z", &opts).await.unwrap();

		assert!(local_env.dir.path().join("x/y/z").is_dir());
		assert!(client.exists("x/y", &opts).await.unwrap());
	}
}
