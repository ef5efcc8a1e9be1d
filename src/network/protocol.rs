//! Wire framing for equation file transfers.
//!
//! Each file is sent as one frame: a fixed 48-byte header followed by the
//! raw payload bytes, with no delimiter or terminator. The receiver relies
//! solely on the declared lengths to find the end of the payload.
//!
//! ```text
//! +------------------+
//! | header_size (4)  |  u32 big-endian, constant 48
//! +------------------+
//! | name_length (4)  |  u32 big-endian, byte length of the UTF-8 name
//! +------------------+
//! | stream_size (8)  |  u64 big-endian, name_length + payload length
//! +------------------+
//! | name_field (32)  |  UTF-8 name bytes, zero-padded to 32
//! +------------------+
//! | payload          |  raw file bytes (stream_size - name_length)
//! +------------------+
//! ```
//!
//! Names are capped at 24 bytes, leaving at least 8 bytes of the name
//! field permanently zero. That margin is part of the wire format as the
//! server expects it; keep the 32/24 split.

use crate::{EqusendError, Result};

/// Serialized header length in bytes. Also the value of the first field.
pub const HEADER_SIZE: usize = 48;

/// Fixed width of the zero-padded name slot.
pub const NAME_FIELD_SIZE: usize = 32;

/// Maximum byte length of a UTF-8 encoded file name.
pub const MAX_NAME_LEN: usize = 24;

/// A fully serialized frame, ready to be written to a socket in one piece.
#[derive(Debug, Clone)]
pub struct Frame {
    name_length: u32,
    stream_size: u64,
    bytes: Vec<u8>,
}

impl Frame {
    /// Validate `name` and serialize header plus payload into one
    /// contiguous buffer.
    ///
    /// Fails with `NameTooLong` if the name encodes to more than 24 bytes,
    /// producing no partial output. Fails with `FrameSize` if the header
    /// section does not come out at exactly 48 bytes; that indicates an
    /// encoder defect rather than bad input.
    pub fn encode(name: &str, payload: &[u8]) -> Result<Self> {
        let name_bytes = name.as_bytes();
        if name_bytes.len() > MAX_NAME_LEN {
            return Err(EqusendError::NameTooLong {
                name: name.to_string(),
                len: name_bytes.len(),
                max: MAX_NAME_LEN,
            });
        }

        let name_length = name_bytes.len() as u32;
        let stream_size = name_bytes.len() as u64 + payload.len() as u64;

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&(HEADER_SIZE as u32).to_be_bytes());
        bytes.extend_from_slice(&name_length.to_be_bytes());
        bytes.extend_from_slice(&stream_size.to_be_bytes());

        let mut name_field = [0u8; NAME_FIELD_SIZE];
        name_field[..name_bytes.len()].copy_from_slice(name_bytes);
        bytes.extend_from_slice(&name_field);

        if bytes.len() != HEADER_SIZE {
            return Err(EqusendError::FrameSize {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        bytes.extend_from_slice(payload);

        Ok(Self {
            name_length,
            stream_size,
            bytes,
        })
    }

    pub fn name_length(&self) -> u32 {
        self.name_length
    }

    pub fn stream_size(&self) -> u64 {
        self.stream_size
    }

    /// Header and payload as a single wire-ready buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total bytes that will go on the wire.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decoded view of a 48-byte frame header.
///
/// The client never reads headers off the wire; this exists for the
/// receiving side of tests and as the reference for what a server parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub header_size: u32,
    pub name_length: u32,
    pub stream_size: u64,
    pub name_field: [u8; NAME_FIELD_SIZE],
}

impl FrameHeader {
    /// Parse the fixed header from the front of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(EqusendError::FrameSize {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let header_size = u32::from_be_bytes(bytes[0..4].try_into().unwrap());
        let name_length = u32::from_be_bytes(bytes[4..8].try_into().unwrap());
        let stream_size = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        let name_field: [u8; NAME_FIELD_SIZE] = bytes[16..48].try_into().unwrap();

        Ok(Self {
            header_size,
            name_length,
            stream_size,
            name_field,
        })
    }

    /// The file name carried in the header, ignoring padding bytes.
    pub fn name(&self) -> Result<&str> {
        let name_bytes = &self.name_field[..self.name_length as usize];
        std::str::from_utf8(name_bytes).map_err(|e| {
            EqusendError::FileOperation(format!("header name is not valid UTF-8: {}", e))
        })
    }

    /// Payload byte count declared by this header.
    pub fn payload_len(&self) -> u64 {
        self.stream_size - self.name_length as u64
    }
}
