//! A bounds-checked byte cursor with switchable endianness.
//!
//! The loader configures the byte order once, from the record header, so
//! individual asset factories never branch on it. Every multi-byte read
//! dispatches through the configured order; reads past the end of the buffer
//! are hard `DecodeMalformed` errors rather than truncated values.

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};

use crate::errors::*;

/// Declared byte order of a binary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
    Native,
}

impl Default for Endian {
    fn default() -> Self {
        Endian::Native
    }
}

macro_rules! impl_read {
    ($name:ident, $ty:ty, $size:expr, $which:ident) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let buf = self.take($size)?;
            Ok(match self.order {
                Endian::Little => LittleEndian::$which(buf),
                Endian::Big => BigEndian::$which(buf),
                Endian::Native => NativeEndian::$which(buf),
            })
        }
    };
}

/// A sequential reader over one record's bytes.
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    order: Endian,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor in native byte order.
    pub fn new(buf: &'a [u8]) -> Self {
        ByteCursor {
            buf,
            pos: 0,
            order: Endian::Native,
        }
    }

    /// Creates a cursor with an explicit byte order.
    pub fn with_order(buf: &'a [u8], order: Endian) -> Self {
        ByteCursor { buf, pos: 0, order }
    }

    #[inline]
    pub fn order(&self) -> Endian {
        self.order
    }

    #[inline]
    pub fn set_order(&mut self, order: Endian) {
        self.order = order;
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Advances past `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Reads the next `n` bytes as a raw slice.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|v| v as i8)
    }

    impl_read!(read_u16, u16, 2, read_u16);
    impl_read!(read_u32, u32, 4, read_u32);
    impl_read!(read_u64, u64, 8, read_u64);
    impl_read!(read_f32, f32, 4, read_f32);
    impl_read!(read_f64, f64, 8, read_f64);

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_u16().map(|v| v as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_u64().map(|v| v as i64)
    }

    /// Reads a length-prefixed (u32) UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::DecodeMalformed("string field is not valid UTF-8".into()))
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::DecodeMalformed(format!(
                "read of {} bytes at offset {} overruns record of {} bytes",
                n,
                self.pos,
                self.buf.len()
            )));
        }

        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}
