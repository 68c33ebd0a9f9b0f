use crate::value::{Value, tag::canonical_tag};

///
/// Canonical byte encoding.
///
/// This module owns the type-specific byte payload described by the hasher's
/// canonical encoding table: fixed-width little-endian integers, IEEE-754 bit
/// patterns for floats, raw (unprefixed) bytes for text/formatted-int
/// variants, and the raw blob for `Bytes`. It is shared by the hasher (which
/// consumes the payload with no length prefix — the next field follows
/// immediately) and by the persistence codec (which wraps the same payload
/// with an explicit length prefix on disk, see `codec`).
///

/// Two-byte little-endian type tag, as consumed by the hasher's canonical stream.
#[must_use]
pub fn tag_bytes(value: &Value) -> [u8; 2] {
    canonical_tag(value).to_u16().to_le_bytes()
}

/// Type-specific payload bytes, with no length prefix.
#[must_use]
pub fn payload_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Null => Vec::new(),
        Value::I8(v) => vec![*v as u8],
        Value::U8(v) => vec![*v],
        Value::Bool(v) => vec![u8::from(*v)],
        Value::Char(v) => vec![*v],
        Value::I16(v) => v.to_le_bytes().to_vec(),
        Value::U16(v) => v.to_le_bytes().to_vec(),
        Value::I32(v) => v.to_le_bytes().to_vec(),
        Value::U32(v) => v.to_le_bytes().to_vec(),
        Value::F32(v) => v.to_bits().to_le_bytes().to_vec(),
        Value::I64(v) => v.to_le_bytes().to_vec(),
        Value::U64(v) => v.to_le_bytes().to_vec(),
        Value::F64(v) => v.to_bits().to_le_bytes().to_vec(),
        Value::Size(v) => v.to_le_bytes().to_vec(),
        Value::Timestamp(v) => v.to_le_bytes().to_vec(),
        Value::Duration(v) => v.to_le_bytes().to_vec(),
        Value::Hex(s) | Value::Oct(s) | Value::Bin(s) | Value::Text(s) => s.as_bytes().to_vec(),
        Value::Bytes(b) => b.clone(),
    }
}
