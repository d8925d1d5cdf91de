//! Bounded cursor over an untrusted byte buffer

use thiserror::Error;

/// A u64 varint never needs more than ten 7-bit groups
pub const MAX_VARINT_LEN: usize = 10;

/// Malformed binary input. Fatal to the decode attempt that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of buffer at offset {offset}: needed {needed} more byte(s)")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("varint at offset {offset} is not terminated within {MAX_VARINT_LEN} bytes")]
    VarintTooLong { offset: usize },

    #[error("length {length} at offset {offset} does not fit the buffer")]
    LengthOverflow { offset: usize, length: u64 },

    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType { wire_type: u8, offset: usize },

    #[error("field {field} has wire type {actual:?}, expected {expected:?}")]
    WireTypeMismatch {
        field: u32,
        expected: WireType,
        actual: WireType,
    },

    #[error("invalid field number 0 at offset {offset}")]
    InvalidFieldNumber { offset: usize },

    #[error("empty message")]
    EmptyMessage,
}

/// Wire shapes the reader knows how to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    fn from_raw(raw: u8, offset: usize) -> Result<Self, DecodeError> {
        match raw {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            _ => Err(DecodeError::UnsupportedWireType {
                wire_type: raw,
                offset,
            }),
        }
    }
}

/// Cursor over a byte slice. Every read is bounds-checked; a failed read
/// leaves no partial result behind.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Read an unsigned LSB-first base-128 varint
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let start = self.pos;
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = *self.buf.get(start + i).ok_or(DecodeError::UnexpectedEof {
                offset: start + i,
                needed: 1,
            })?;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                self.pos = start + i + 1;
                return Ok(value);
            }
        }
        Err(DecodeError::VarintTooLong { offset: start })
    }

    /// Read a varint and keep the low 32 bits as a signed value
    pub fn read_int32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_varint()? as u32 as i32)
    }

    /// Read a varint length followed by that many bytes
    pub fn read_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let offset = self.pos;
        let length = self.read_varint()?;
        let Some(len) = usize::try_from(length)
            .ok()
            .filter(|len| *len <= self.remaining())
        else {
            self.pos = offset;
            return Err(DecodeError::LengthOverflow { offset, length });
        };
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a field key, returning the field number and wire type
    pub fn read_tag(&mut self) -> Result<(u32, WireType), DecodeError> {
        let offset = self.pos;
        let key = self.read_varint()?;
        let decoded = u32::try_from(key >> 3)
            .map_err(|_| DecodeError::LengthOverflow {
                offset,
                length: key,
            })
            .and_then(|field| match field {
                0 => Err(DecodeError::InvalidFieldNumber { offset }),
                _ => Ok((field, WireType::from_raw((key & 0x7) as u8, offset)?)),
            });
        if decoded.is_err() {
            self.pos = offset;
        }
        decoded
    }

    /// Skip over the value of a field with the given wire type
    pub fn skip(&mut self, wire_type: WireType) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::Fixed64 => self.advance(8),
            WireType::LengthDelimited => self.read_bytes().map(|_| ()),
            WireType::Fixed32 => self.advance(4),
        }
    }

    fn advance(&mut self, count: usize) -> Result<(), DecodeError> {
        if count > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: count - self.remaining(),
            });
        }
        self.pos += count;
        Ok(())
    }
}

/// Check that a known field arrived with the wire type its layout requires
pub(crate) fn expect_wire(
    field: u32,
    actual: WireType,
    expected: WireType,
) -> Result<(), DecodeError> {
    if actual == expected {
        Ok(())
    } else {
        Err(DecodeError::WireTypeMismatch {
            field,
            expected,
            actual,
        })
    }
}

/// Encode an unsigned varint, as used for leaf length prefixes
pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}
