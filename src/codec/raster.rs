//! Raster image codec.
//!
//! Two in-memory representations are supported:
//!
//! - [`Bitmap`]: interleaved 8-bit pixels in BGR(A) channel order, the layout
//!   OpenCV-style pipelines expect.
//! - [`DynamicImage`]: the `image` crate's object representation, RGB(A)
//!   order.
//!
//! Both decode paths accept the same encoded bytes.

use super::{Codec, DecodeHint};
use crate::payload::{DecodedImage, ImageRepr, Payload};
use crate::{Result, StorageError};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Interleaved 8-bit bitmap with 1 (grey), 3 (BGR) or 4 (BGRA) channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
	width: u32,
	height: u32,
	channels: u8,
	data: Vec<u8>,
}

impl Bitmap {
	/// Create a bitmap from raw row-major pixel data.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::UnsupportedPayload` `` if `channels` is not 1,
	/// 3 or 4, or if `data` does not hold exactly `width * height * channels`
	/// bytes.
	pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
		if !matches!(channels, 1 | 3 | 4) {
			return Err(StorageError::UnsupportedPayload(format!(
				"bitmap with {} channels",
				channels
			)));
		}

		let expected = width as usize * height as usize * channels as usize;
		if data.len() != expected {
			return Err(StorageError::UnsupportedPayload(format!(
				"bitmap {}x{}x{} needs {} bytes, got {}",
				width,
				height,
				channels,
				expected,
				data.len()
			)));
		}

		Ok(Self {
			width,
			height,
			channels,
			data,
		})
	}

	/// Convert an image object, swapping red and blue for colour images.
	///
	/// 16-bit and float images are reduced to 8 bits per channel.
	pub fn from_image(image: &DynamicImage) -> Self {
		let (width, height) = (image.width(), image.height());
		let color = image.color();

		let (channels, mut data) = if !color.has_color() && !color.has_alpha() {
			(1, image.to_luma8().into_raw())
		} else if color.has_alpha() {
			(4, image.to_rgba8().into_raw())
		} else {
			(3, image.to_rgb8().into_raw())
		};
		swap_red_blue(&mut data, channels);

		Self {
			width,
			height,
			channels,
			data,
		}
	}

	/// Convert to an image object in RGB(A) order.
	pub fn to_image(&self) -> DynamicImage {
		let mut data = self.data.clone();
		swap_red_blue(&mut data, self.channels);

		// Dimensions were validated on construction, so the buffers always fit.
		let image = match self.channels {
			1 => GrayImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageLuma8),
			4 => RgbaImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageRgba8),
			_ => RgbImage::from_raw(self.width, self.height, data).map(DynamicImage::ImageRgb8),
		};
		image.unwrap_or_else(|| DynamicImage::new_rgb8(self.width, self.height))
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// Raw pixel bytes.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Pixel at `(x, y)` as a channel slice, in BGR(A) order.
	pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
		if x >= self.width || y >= self.height {
			return None;
		}
		let channels = self.channels as usize;
		let offset = (y as usize * self.width as usize + x as usize) * channels;
		self.data.get(offset..offset + channels)
	}
}

impl From<&DynamicImage> for Bitmap {
	fn from(image: &DynamicImage) -> Self {
		Bitmap::from_image(image)
	}
}

fn swap_red_blue(data: &mut [u8], channels: u8) {
	if channels < 3 {
		return;
	}
	for pixel in data.chunks_exact_mut(channels as usize) {
		pixel.swap(0, 2);
	}
}

/// Raster codec; lossless PNG unless a format is requested explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
	/// Encode a bitmap in the given raster format.
	pub fn encode_bitmap(&self, bitmap: &Bitmap, format: ImageFormat) -> Result<Vec<u8>> {
		let mut buffer = Cursor::new(Vec::new());
		bitmap.to_image().write_to(&mut buffer, format)?;
		Ok(buffer.into_inner())
	}

	/// Decode into a 3-channel BGR bitmap, dropping alpha and expanding grey.
	pub fn decode_bitmap(&self, bytes: &[u8]) -> Result<Bitmap> {
		let image = image::load_from_memory(bytes)?;
		let mut data = image.to_rgb8().into_raw();
		swap_red_blue(&mut data, 3);
		Bitmap::new(image.width(), image.height(), 3, data)
	}

	/// Decode into an image object, keeping the stored colour type.
	pub fn decode_image(&self, bytes: &[u8]) -> Result<DynamicImage> {
		Ok(image::load_from_memory(bytes)?)
	}

	/// Decode into the requested representation.
	pub fn decode_as(&self, bytes: &[u8], repr: ImageRepr) -> Result<DecodedImage> {
		match repr {
			ImageRepr::Bitmap => self.decode_bitmap(bytes).map(DecodedImage::Bitmap),
			ImageRepr::Object => self.decode_image(bytes).map(DecodedImage::Object),
		}
	}

	/// Format implied by a file name's extension, PNG when unknown.
	pub fn format_for_path(path: &str) -> ImageFormat {
		ImageFormat::from_path(Path::new(path)).unwrap_or(ImageFormat::Png)
	}
}

impl Codec for RasterCodec {
	fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
		match payload {
			Payload::Bitmap(bitmap) => self.encode_bitmap(bitmap, ImageFormat::Png),
			Payload::Image(image) => self.encode_bitmap(&Bitmap::from_image(image), ImageFormat::Png),
			other => Err(StorageError::UnsupportedPayload(format!(
				"raster codec cannot encode {}",
				other.kind()
			))),
		}
	}

	fn decode(&self, bytes: &[u8], hint: DecodeHint) -> Result<Payload> {
		match hint {
			DecodeHint::Image(ImageRepr::Object) => self.decode_image(bytes).map(Payload::Image),
			_ => self.decode_bitmap(bytes).map(Payload::Bitmap),
		}
	}
}
