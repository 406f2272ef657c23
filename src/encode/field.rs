//! Flattened wire fields and the 16-bit framing rules.

use crate::error::MapError;
use crate::Result;

/// Largest length a string prefix or a collection count can carry.
///
/// Prefixes and counts are stored in 16-bit words; decoders read them as
/// unsigned.
pub const MAX_WORD_LEN: usize = u16::MAX as usize;

/// One flattened value waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedField {
    /// 2-byte little-endian signed integer.
    Word(i16),
    /// 4-byte little-endian signed integer.
    Dword(i32),
    /// 4-byte little-endian IEEE-754 float.
    Float(f32),
    /// Raw UTF-8 bytes, no terminator.
    Bytes(String),
}

impl EncodedField {
    /// Bytes this field occupies on the wire.
    #[inline]
    pub fn byte_len(&self) -> usize {
        match self {
            EncodedField::Word(_) => 2,
            EncodedField::Dword(_) | EncodedField::Float(_) => 4,
            EncodedField::Bytes(s) => s.len(),
        }
    }
}

/// Exact number of bytes `fields` serialize to.
pub fn size_of(fields: &[EncodedField]) -> usize {
    fields.iter().map(EncodedField::byte_len).sum()
}

/// Frame `s` as a byte-length word followed by its raw bytes.
pub fn encode_string(s: &str) -> Result<[EncodedField; 2]> {
    let length = s.len();
    if length > MAX_WORD_LEN {
        return Err(MapError::StringTooLong {
            length,
            max: MAX_WORD_LEN,
        });
    }
    Ok([
        EncodedField::Word(length as u16 as i16),
        EncodedField::Bytes(s.to_owned()),
    ])
}

/// Narrow an integer to a word, wrapping like a two's complement store.
#[inline]
pub fn wrap_word(v: i64) -> i16 {
    v as i16
}

/// Truncate a real value toward zero, then narrow it to a word.
#[inline]
pub fn truncate_word(v: f64) -> i16 {
    wrap_word(v.trunc() as i64)
}

/// Ordered field sequence for one encode pass.
///
/// Both the size computation and the byte emission read this one list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList {
    fields: Vec<EncodedField>,
}

impl FieldList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a word.
    #[inline]
    pub fn word(&mut self, v: i16) {
        self.fields.push(EncodedField::Word(v));
    }

    /// Append a dword.
    #[inline]
    pub fn dword(&mut self, v: i32) {
        self.fields.push(EncodedField::Dword(v));
    }

    /// Append a float.
    #[inline]
    pub fn float(&mut self, v: f32) {
        self.fields.push(EncodedField::Float(v));
    }

    /// Append a length-prefixed string.
    pub fn string(&mut self, s: &str) -> Result<()> {
        self.fields.extend(encode_string(s)?);
        Ok(())
    }

    /// Append a collection count, rejecting counts a word cannot frame.
    pub fn count(&mut self, what: &'static str, count: usize) -> Result<()> {
        if count > MAX_WORD_LEN {
            return Err(MapError::CountOverflow {
                what,
                count,
                max: MAX_WORD_LEN,
            });
        }
        self.word(count as u16 as i16);
        Ok(())
    }

    /// Append every field of `other`.
    pub fn append(&mut self, other: FieldList) {
        self.fields.extend(other.fields);
    }

    /// Exact serialized size.
    pub fn byte_len(&self) -> usize {
        size_of(&self.fields)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field has been appended.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in order.
    pub fn as_slice(&self) -> &[EncodedField] {
        &self.fields
    }
}
