//! Typed property bags.

use crate::document::{Properties, PropertyValue};
use crate::error::MapError;
use crate::Result;

use super::field::FieldList;

/// Type tag written before every property payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
#[allow(missing_docs)]
pub enum PropertyTag {
    None = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
}

/// Encode a property bag: a count word, then per entry the key, a type tag
/// and the typed payload.
pub fn encode_properties(props: &Properties) -> Result<FieldList> {
    let mut out = FieldList::new();
    out.count("properties", props.len())?;

    for (name, value) in props.iter() {
        out.string(name)?;
        match value {
            PropertyValue::Bool(v) => {
                out.word(PropertyTag::Bool as i16);
                out.word(i16::from(*v));
            }
            PropertyValue::Int(v) => {
                let v = i32::try_from(*v).map_err(|_| MapError::unsupported(name, "int64"))?;
                out.word(PropertyTag::Int as i16);
                out.dword(v);
            }
            PropertyValue::Float(v) => {
                out.word(PropertyTag::Float as i16);
                out.float(*v as f32);
            }
            PropertyValue::String(v) => {
                out.word(PropertyTag::String as i16);
                out.string(v)?;
            }
            other => return Err(MapError::unsupported(name, other.kind_name())),
        }
    }

    Ok(out)
}
