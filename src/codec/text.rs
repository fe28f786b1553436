//! Text and raw byte codecs.

use super::{Codec, DecodeHint};
use crate::payload::Payload;
use crate::{Result, StorageError};

/// UTF-8 text, stored without transformation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl TextCodec {
	pub fn decode_text(&self, bytes: Vec<u8>) -> Result<String> {
		String::from_utf8(bytes).map_err(|e| StorageError::CodecError(e.to_string()))
	}
}

impl Codec for TextCodec {
	fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
		match payload {
			Payload::Text(text) => Ok(text.as_bytes().to_vec()),
			other => Err(StorageError::UnsupportedPayload(format!(
				"text codec cannot encode {}",
				other.kind()
			))),
		}
	}

	fn decode(&self, bytes: &[u8], _hint: DecodeHint) -> Result<Payload> {
		self.decode_text(bytes.to_vec()).map(Payload::Text)
	}
}

/// Identity codec for raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec for BytesCodec {
	fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
		match payload {
			Payload::Bytes(bytes) => Ok(bytes.clone()),
			other => Err(StorageError::UnsupportedPayload(format!(
				"bytes codec cannot encode {}",
				other.kind()
			))),
		}
	}

	fn decode(&self, bytes: &[u8], _hint: DecodeHint) -> Result<Payload> {
		Ok(Payload::Bytes(bytes.to_vec()))
	}
}
