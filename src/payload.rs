//! Payload values moved between callers and backends.

use crate::codec::{Bitmap, Frame, Series};
use image::DynamicImage;
use std::fmt;

/// Payload variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
	Bitmap,
	Image,
	Table,
	Text,
	Bytes,
}

impl fmt::Display for PayloadKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PayloadKind::Bitmap => write!(f, "bitmap"),
			PayloadKind::Image => write!(f, "image object"),
			PayloadKind::Table => write!(f, "table"),
			PayloadKind::Text => write!(f, "text"),
			PayloadKind::Bytes => write!(f, "bytes"),
		}
	}
}

/// Data written to or read from storage.
///
/// A payload is owned by a single call: `write` consumes it and each read
/// returns a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
	/// Raster image in BGR(A) channel order
	Bitmap(Bitmap),
	/// Raster image object in RGB(A) channel order
	Image(DynamicImage),
	/// Tabular frame
	Table(Frame),
	/// UTF-8 text
	Text(String),
	/// Raw bytes
	Bytes(Vec<u8>),
}

impl Payload {
	/// Text payload from anything displayable.
	///
	/// ```
	/// use storage_adapter::Payload;
	///
	/// assert_eq!(Payload::text(42), Payload::Text("42".to_string()));
	/// ```
	pub fn text(value: impl fmt::Display) -> Self {
		Payload::Text(value.to_string())
	}

	pub fn kind(&self) -> PayloadKind {
		match self {
			Payload::Bitmap(_) => PayloadKind::Bitmap,
			Payload::Image(_) => PayloadKind::Image,
			Payload::Table(_) => PayloadKind::Table,
			Payload::Text(_) => PayloadKind::Text,
			Payload::Bytes(_) => PayloadKind::Bytes,
		}
	}

	/// Convert image objects to bitmap form; other variants pass through.
	pub fn into_bitmap_form(self) -> Self {
		match self {
			Payload::Image(image) => Payload::Bitmap(Bitmap::from_image(&image)),
			other => other,
		}
	}
}

impl From<Bitmap> for Payload {
	fn from(bitmap: Bitmap) -> Self {
		Payload::Bitmap(bitmap)
	}
}

impl From<DynamicImage> for Payload {
	fn from(image: DynamicImage) -> Self {
		Payload::Image(image)
	}
}

impl From<Frame> for Payload {
	fn from(frame: Frame) -> Self {
		Payload::Table(frame)
	}
}

impl From<Series> for Payload {
	fn from(series: Series) -> Self {
		Payload::Table(series.into_frame())
	}
}

impl From<String> for Payload {
	fn from(text: String) -> Self {
		Payload::Text(text)
	}
}

impl From<&str> for Payload {
	fn from(text: &str) -> Self {
		Payload::Text(text.to_string())
	}
}

impl From<Vec<u8>> for Payload {
	fn from(bytes: Vec<u8>) -> Self {
		Payload::Bytes(bytes)
	}
}

impl From<&[u8]> for Payload {
	fn from(bytes: &[u8]) -> Self {
		Payload::Bytes(bytes.to_vec())
	}
}

/// Representation requested from an image read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageRepr {
	/// 3-channel BGR [`Bitmap`]
	#[default]
	Bitmap,
	/// [`DynamicImage`] object
	Object,
}

/// Result of an image read.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedImage {
	Bitmap(Bitmap),
	Object(DynamicImage),
}

impl DecodedImage {
	pub fn width(&self) -> u32 {
		match self {
			DecodedImage::Bitmap(bitmap) => bitmap.width(),
			DecodedImage::Object(image) => image.width(),
		}
	}

	pub fn height(&self) -> u32 {
		match self {
			DecodedImage::Bitmap(bitmap) => bitmap.height(),
			DecodedImage::Object(image) => image.height(),
		}
	}

	/// Bitmap form, converting an object if needed.
	pub fn into_bitmap(self) -> Bitmap {
		match self {
			DecodedImage::Bitmap(bitmap) => bitmap,
			DecodedImage::Object(image) => Bitmap::from_image(&image),
		}
	}

	/// Object form, converting a bitmap if needed.
	pub fn into_image(self) -> DynamicImage {
		match self {
			DecodedImage::Bitmap(bitmap) => bitmap.to_image(),
			DecodedImage::Object(image) => image,
		}
	}
}
