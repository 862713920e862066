//! Little-endian byte cursor and writer shared by all block codecs.
//!
//! `ByteReader` tracks the absolute offset of its window in the input file so
//! that every `FormatError` points at the byte where decoding failed.

use crate::error::{EncodeError, FormatError, FormatReason};

/// Bounds-checked reader over a window of the input.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self::with_base(buf, 0)
    }

    /// Reader over `buf`, whose first byte sits at absolute offset `base`.
    pub(crate) fn with_base(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    /// Absolute offset of the next byte.
    pub(crate) fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes consumed from this window.
    pub(crate) fn consumed(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn error(&self, reason: FormatReason) -> FormatError {
        FormatError::new(self.offset(), reason)
    }

    pub(crate) fn bytes(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], FormatError> {
        if n > self.remaining() {
            return Err(self.error(FormatReason::Truncated {
                what,
                needed: n,
                available: self.remaining(),
            }));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Split off the next `n` bytes as an independent reader (offsets preserved).
    pub(crate) fn sub(&mut self, n: usize, what: &'static str) -> Result<ByteReader<'a>, FormatError> {
        let base = self.offset();
        let buf = self.bytes(n, what)?;
        Ok(ByteReader::with_base(buf, base))
    }

    pub(crate) fn skip(&mut self, n: usize, what: &'static str) -> Result<(), FormatError> {
        self.bytes(n, what).map(|_| ())
    }

    pub(crate) fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N, what)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self, what: &'static str) -> Result<u8, FormatError> {
        Ok(self.bytes(1, what)?[0])
    }

    pub(crate) fn u16(&mut self, what: &'static str) -> Result<u16, FormatError> {
        Ok(u16::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.array(what)?))
    }

    pub(crate) fn u64(&mut self, what: &'static str) -> Result<u64, FormatError> {
        Ok(u64::from_le_bytes(self.array(what)?))
    }

    /// Fixed-width NUL-padded string: the span is consumed in full, the value
    /// ends at the first NUL.
    pub(crate) fn fixed_str(&mut self, width: usize, what: &'static str) -> Result<String, FormatError> {
        let start = self.offset();
        let raw = self.bytes(width, what)?;
        let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
        String::from_utf8(raw[..end].to_vec())
            .map_err(|_| FormatError::new(start, FormatReason::InvalidString(what)))
    }

    /// Everything left in this window, copied out verbatim.
    pub(crate) fn bytes_all(self) -> Vec<u8> {
        self.buf[self.pos..].to_vec()
    }

    /// Length-prefixed private payload: u32 size then exactly that many bytes.
    pub(crate) fn private(&mut self, what: &'static str) -> Result<ByteReader<'a>, FormatError> {
        let size = self.u32(what)? as usize;
        self.sub(size, what)
    }
}

/// Growable little-endian output buffer.
#[derive(Debug, Default)]
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub(crate) fn zeros(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub(crate) fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    pub(crate) fn u64(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    /// Write `value` NUL-padded to `width`. Longer values are rejected, never truncated.
    pub(crate) fn fixed_str(&mut self, value: &str, width: usize, field: &'static str) -> Result<(), EncodeError> {
        let raw = value.as_bytes();
        if raw.len() > width {
            return Err(EncodeError::StringTooLong {
                field,
                value: value.to_string(),
                width,
            });
        }
        self.bytes(raw);
        self.zeros(width - raw.len());
        Ok(())
    }

    /// Length-prefixed private payload.
    pub(crate) fn private(&mut self, data: &[u8], what: &'static str) -> Result<(), EncodeError> {
        self.u32(len_u32(data.len(), what)?);
        self.bytes(data);
        Ok(())
    }
}

pub(crate) fn len_u32(len: usize, what: &'static str) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::TooLarge { what, len })
}

/// Require that a sub-reader was consumed exactly.
pub(crate) fn expect_consumed(reader: &ByteReader<'_>, declared: usize, what: &'static str) -> Result<(), FormatError> {
    if reader.consumed() != declared {
        return Err(reader.error(FormatReason::SizeMismatch {
            what,
            declared,
            consumed: reader.consumed(),
        }));
    }
    Ok(())
}
