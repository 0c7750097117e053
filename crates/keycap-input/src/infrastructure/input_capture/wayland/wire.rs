//! Wayland wire format: message framing and argument encoding.
//!
//! Every message is a sequence of 32-bit words in host byte order:
//!
//! ```text
//!   word 0   sender/target object id
//!   word 1   (size_in_bytes << 16) | opcode
//!   word 2.. arguments
//! ```
//!
//! `int`, `uint`, `object` and `new_id` arguments take one word.  `string`
//! and `array` arguments are a length word followed by the payload, padded
//! with zeroes to the next word boundary; a string's length counts its
//! trailing NUL.  File descriptors are not part of the byte stream at all;
//! they ride alongside as `SCM_RIGHTS` ancillary data.

use thiserror::Error;

/// Size of a message header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Largest message the 16-bit size field can describe.
pub const MAX_MESSAGE_SIZE: usize = u16::MAX as usize;

/// Malformed or oversized protocol data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("message body ended early")]
    Truncated,

    #[error("message of {0} bytes exceeds the wire limit")]
    TooLarge(usize),

    #[error("header declares invalid size {0}")]
    BadSize(u16),

    #[error("string argument is not NUL-terminated UTF-8")]
    InvalidString,
}

/// Decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub object_id: u32,
    pub opcode: u16,
    /// Total size including the header.
    pub size: u16,
}

impl MessageHeader {
    /// Parses the first [`HEADER_SIZE`] bytes of `buf`.
    ///
    /// Returns `Ok(None)` if fewer than eight bytes are available.
    pub fn parse(buf: &[u8]) -> Result<Option<Self>, WireError> {
        if buf.len() < HEADER_SIZE {
            return Ok(None);
        }
        let object_id = read_word(buf, 0);
        let word = read_word(buf, 4);
        let header = Self {
            object_id,
            opcode: (word & 0xFFFF) as u16,
            size: (word >> 16) as u16,
        };
        if usize::from(header.size) < HEADER_SIZE || header.size % 4 != 0 {
            return Err(WireError::BadSize(header.size));
        }
        Ok(Some(header))
    }
}

fn read_word(buf: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[at..at + 4]);
    u32::from_ne_bytes(word)
}

const fn padded(len: usize) -> usize {
    (len + 3) & !3
}

/// Builds one outgoing message.
#[derive(Debug)]
pub struct MessageWriter {
    buf: Vec<u8>,
}

impl MessageWriter {
    pub fn new(object_id: u32, opcode: u16) -> Self {
        let mut buf = Vec::with_capacity(32);
        buf.extend_from_slice(&object_id.to_ne_bytes());
        buf.extend_from_slice(&u32::from(opcode).to_ne_bytes());
        Self { buf }
    }

    pub fn uint(mut self, value: u32) -> Self {
        self.buf.extend_from_slice(&value.to_ne_bytes());
        self
    }

    pub fn int(self, value: i32) -> Self {
        self.uint(value as u32)
    }

    pub fn new_id(self, id: u32) -> Self {
        self.uint(id)
    }

    pub fn string(self, value: &str) -> Self {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        self.array(&bytes)
    }

    pub fn array(mut self, value: &[u8]) -> Self {
        self.buf.extend_from_slice(&(value.len() as u32).to_ne_bytes());
        self.buf.extend_from_slice(value);
        self.buf.resize(self.buf.len() + padded(value.len()) - value.len(), 0);
        self
    }

    /// Patches the size into the header and returns the encoded message.
    pub fn finish(mut self) -> Result<Vec<u8>, WireError> {
        let size = self.buf.len();
        if size > MAX_MESSAGE_SIZE {
            return Err(WireError::TooLarge(size));
        }
        let opcode = read_word(&self.buf, 4) & 0xFFFF;
        let word = ((size as u32) << 16) | opcode;
        self.buf[4..8].copy_from_slice(&word.to_ne_bytes());
        Ok(self.buf)
    }
}

/// Reads arguments from one incoming message body (header excluded).
#[derive(Debug)]
pub struct MessageReader<'a> {
    body: &'a [u8],
    pos: usize,
}

impl<'a> MessageReader<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self { body, pos: 0 }
    }

    pub fn uint(&mut self) -> Result<u32, WireError> {
        if self.body.len() < self.pos + 4 {
            return Err(WireError::Truncated);
        }
        let value = read_word(self.body, self.pos);
        self.pos += 4;
        Ok(value)
    }

    pub fn int(&mut self) -> Result<i32, WireError> {
        self.uint().map(|v| v as i32)
    }

    pub fn array(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.uint()? as usize;
        let end = self.pos + padded(len);
        if self.body.len() < end {
            return Err(WireError::Truncated);
        }
        let value = &self.body[self.pos..self.pos + len];
        self.pos = end;
        Ok(value)
    }

    /// Reads a string argument.  A zero length means a null string, returned
    /// as empty.
    pub fn string(&mut self) -> Result<String, WireError> {
        let bytes = self.array()?;
        match bytes.split_last() {
            None => Ok(String::new()),
            Some((0, text)) => std::str::from_utf8(text)
                .map(str::to_owned)
                .map_err(|_| WireError::InvalidString),
            Some(_) => Err(WireError::InvalidString),
        }
    }
}
