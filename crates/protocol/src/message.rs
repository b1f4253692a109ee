//! Device message frames.
//!
//! The bridge carries device messages as a 6-byte header followed by the
//! message data, hex-encoded on the HTTP wire:
//!
//! ```text
//! +------------+----------------+-------------+
//! | kind (u16) | length (u32)   | data        |
//! | big-endian | big-endian     | length bytes|
//! +------------+----------------+-------------+
//! ```

use std::fmt;

use thiserror::Error;

const HEADER_LEN: usize = 6;

/// Message kind of `Initialize`, the handshake every device answers.
pub const KIND_INITIALIZE: u16 = 0;

/// Failure to decode a frame received from (or destined for) the bridge.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
	#[error("malformed data: body is {0} bytes, header needs 6")]
	TooShort(usize),

	#[error("malformed data: header declares {declared} data bytes, body carries {actual}")]
	LengthMismatch { declared: u32, actual: usize },

	#[error("malformed data: invalid hex: {0}")]
	Hex(#[from] hex::FromHexError),
}

/// A device message: protobuf message kind plus raw payload bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Message {
	pub kind: u16,
	pub data: Vec<u8>,
}

impl Message {
	pub fn new(kind: u16, data: impl Into<Vec<u8>>) -> Self {
		Self { kind, data: data.into() }
	}

	/// The empty `Initialize` message, `000000000000` on the wire.
	pub fn initialize() -> Self {
		Self::new(KIND_INITIALIZE, Vec::new())
	}

	/// Encodes header and data into a single frame.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(HEADER_LEN + self.data.len());
		out.extend_from_slice(&self.kind.to_be_bytes());
		out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
		out.extend_from_slice(&self.data);
		out
	}

	/// Decodes a frame, rejecting bodies whose header disagrees with their length.
	pub fn from_bytes(body: &[u8]) -> Result<Self, FrameError> {
		if body.len() < HEADER_LEN {
			return Err(FrameError::TooShort(body.len()));
		}

		let kind = u16::from_be_bytes([body[0], body[1]]);
		let declared = u32::from_be_bytes([body[2], body[3], body[4], body[5]]);
		let data = &body[HEADER_LEN..];
		if data.len() != declared as usize {
			return Err(FrameError::LengthMismatch {
				declared,
				actual: data.len(),
			});
		}

		Ok(Self::new(kind, data))
	}

	/// Hex form sent as the body of `/call` and `/post`.
	pub fn to_hex(&self) -> String {
		hex::encode(self.to_bytes())
	}

	/// Parses the hex body returned by `/call` and `/read`.
	///
	/// Surrounding whitespace is ignored; some bridge builds terminate the body with a newline.
	pub fn from_hex(text: &str) -> Result<Self, FrameError> {
		let bytes = hex::decode(text.trim())?;
		Self::from_bytes(&bytes)
	}
}

impl fmt::Debug for Message {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Message")
			.field("kind", &self.kind)
			.field("len", &self.data.len())
			.finish()
	}
}
