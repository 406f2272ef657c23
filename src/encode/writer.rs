//! Little-endian primitive writes into a pre-sized buffer.

use byteorder::{ByteOrder, LittleEndian};

use super::field::EncodedField;

/// Writes fixed-layout values into a pre-sized buffer.
///
/// Every write lands at the current offset and advances it by the value's
/// width. Writing past the end of the buffer panics: the buffer is sized from
/// the same field list, so an overrun is a bug, not an input problem.
pub struct PrimitiveWriter<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> PrimitiveWriter<'a> {
    /// Start writing at offset 0 of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes written so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 2-byte signed word.
    pub fn write_word(&mut self, v: i16) {
        LittleEndian::write_i16(self.claim(2), v);
    }

    /// 4-byte signed dword.
    pub fn write_dword(&mut self, v: i32) {
        LittleEndian::write_i32(self.claim(4), v);
    }

    /// 4-byte IEEE-754 float.
    pub fn write_float(&mut self, v: f32) {
        LittleEndian::write_f32(self.claim(4), v);
    }

    /// Raw UTF-8 bytes of `s`.
    pub fn write_bytes(&mut self, s: &str) {
        let bytes = s.as_bytes();
        self.claim(bytes.len()).copy_from_slice(bytes);
    }

    /// Write `field` with its kind's width.
    pub fn write_field(&mut self, field: &EncodedField) {
        match field {
            EncodedField::Word(v) => self.write_word(*v),
            EncodedField::Dword(v) => self.write_dword(*v),
            EncodedField::Float(v) => self.write_float(*v),
            EncodedField::Bytes(s) => self.write_bytes(s),
        }
    }

    fn claim(&mut self, width: usize) -> &mut [u8] {
        let start = self.offset;
        let end = start + width;
        assert!(
            end <= self.buf.len(),
            "write of {width} bytes at offset {start} overruns {} byte buffer",
            self.buf.len()
        );
        self.offset = end;
        &mut self.buf[start..end]
    }
}
