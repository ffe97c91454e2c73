//! Bounded little-endian byte reader underlying the binary→JSON engine.
//!
//! [`InputBuffer`] wraps a caller-owned slice and consumes it front to back
//! in a non-backtracking, zero-lookahead fashion: a byte can only be viewed
//! by consuming it, and once consumed it cannot be revisited. Every accessor
//! fails with [`ErrorKind::EndOfInput`] rather than reading past the end of
//! the slice.
//!
//! The reader deliberately does *not* police trailing bytes; whether a
//! buffer must be fully consumed after a top-level decode is a caller
//! concern.

use crate::error::ErrorKind;

/// A shrinking view over an immutable byte slice.
#[derive(Debug, Clone, Copy)]
pub struct InputBuffer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> InputBuffer<'a> {
    /// Wraps a slice; the read position starts at its first byte.
    pub fn new(data: &'a [u8]) -> Self {
        InputBuffer { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Number of bytes that can still be consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True when every byte of the underlying slice has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Consumes and returns a single byte.
    pub fn read_byte(&mut self) -> Result<u8, ErrorKind> {
        let byte = *self.data.get(self.pos).ok_or(ErrorKind::EndOfInput)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Consumes and returns the next `n` bytes as a borrowed slice.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], ErrorKind> {
        if self.remaining() < n {
            return Err(ErrorKind::EndOfInput);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consumes `N` bytes and returns them in array form.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ErrorKind> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_exact(N)?);
        Ok(arr)
    }

    pub fn read_u16(&mut self) -> Result<u16, ErrorKind> {
        self.read_array::<2>().map(u16::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16, ErrorKind> {
        self.read_array::<2>().map(i16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, ErrorKind> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Result<i32, ErrorKind> {
        self.read_array::<4>().map(i32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, ErrorKind> {
        self.read_array::<8>().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, ErrorKind> {
        self.read_array::<8>().map(i64::from_le_bytes)
    }

    pub fn read_u128(&mut self) -> Result<u128, ErrorKind> {
        self.read_array::<16>().map(u128::from_le_bytes)
    }

    pub fn read_i128(&mut self) -> Result<i128, ErrorKind> {
        self.read_array::<16>().map(i128::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, ErrorKind> {
        self.read_array::<4>().map(f32::from_le_bytes)
    }

    pub fn read_f64(&mut self) -> Result<f64, ErrorKind> {
        self.read_array::<8>().map(f64::from_le_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_front_to_back() {
        let mut buf = InputBuffer::new(&[0x01, 0x02, 0x03, 0x04, 0x05]);
        assert_eq!(buf.read_byte().unwrap(), 0x01);
        assert_eq!(buf.read_u16().unwrap(), 0x0302);
        assert_eq!(buf.remaining(), 2);
        assert_eq!(buf.read_exact(2).unwrap(), &[0x04, 0x05]);
        assert!(buf.is_empty());
    }

    #[test]
    fn fails_past_end_without_consuming() {
        let mut buf = InputBuffer::new(&[0xaa]);
        assert_eq!(buf.read_u32(), Err(ErrorKind::EndOfInput));
        assert_eq!(buf.remaining(), 1);
        assert_eq!(buf.read_byte().unwrap(), 0xaa);
        assert_eq!(buf.read_byte(), Err(ErrorKind::EndOfInput));
    }

    #[test]
    fn little_endian_words() {
        let mut buf = InputBuffer::new(&[0xef, 0xbe, 0xad, 0xde]);
        assert_eq!(buf.read_u32().unwrap(), 0xdead_beef);
    }
}
