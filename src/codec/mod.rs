//! Payload codecs.
//!
//! Each payload variant maps to exactly one codec through [`codec_for`].
//! Image objects are converted to bitmaps before encoding, so both image
//! variants share the raster codec.

pub mod raster;
pub mod table;
pub mod text;

use crate::Result;
use crate::payload::{ImageRepr, Payload, PayloadKind};

pub use raster::{Bitmap, RasterCodec};
pub use table::{ColumnType, Frame, Series, TableCodec, Value};
pub use text::{BytesCodec, TextCodec};

/// Caller preference passed to [`Codec::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecodeHint {
	#[default]
	None,
	/// Representation for decoded images.
	Image(ImageRepr),
	/// Column types for decoded tables, in header order.
	Table(Vec<ColumnType>),
}

/// Conversion between an in-memory payload and a backend byte stream.
pub trait Codec: Send + Sync {
	/// Serialize a payload.
	///
	/// # Errors
	///
	/// Returns `` `StorageError::UnsupportedPayload` `` if the payload variant
	/// does not belong to this codec, or `` `StorageError::CodecError` `` if
	/// serialization fails.
	fn encode(&self, payload: &Payload) -> Result<Vec<u8>>;

	/// Deserialize bytes produced by [`Codec::encode`].
	fn decode(&self, bytes: &[u8], hint: DecodeHint) -> Result<Payload>;
}

static RASTER: RasterCodec = RasterCodec;
static TABLE: TableCodec = TableCodec;
static TEXT: TextCodec = TextCodec;
static BYTES: BytesCodec = BytesCodec;

/// Codec responsible for a payload variant.
pub fn codec_for(kind: PayloadKind) -> &'static dyn Codec {
	match kind {
		PayloadKind::Bitmap | PayloadKind::Image => &RASTER,
		PayloadKind::Table => &TABLE,
		PayloadKind::Text => &TEXT,
		PayloadKind::Bytes => &BYTES,
	}
}

/// Encode a payload with the codec of its variant.
pub fn encode(payload: &Payload) -> Result<Vec<u8>> {
	codec_for(payload.kind()).encode(payload)
}
