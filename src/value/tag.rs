use crate::value::Value;

///
/// ValueTag
///
/// Stable canonical value-variant tag used by the hasher and the on-disk
/// codec. Tag values are part of the wire format and must remain fixed.
///
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueTag {
    Null = 0,
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    U8 = 5,
    U16 = 6,
    U32 = 7,
    U64 = 8,
    F32 = 9,
    F64 = 10,
    Bool = 11,
    Char = 12,
    Text = 13,
    Size = 14,
    Timestamp = 15,
    Duration = 16,
    Hex = 17,
    Oct = 18,
    Bin = 19,
    Bytes = 20,
}

impl ValueTag {
    /// Stable wire/hash tag for this variant.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Resolve a tag read off the wire back into a `ValueTag`.
    #[must_use]
    pub const fn from_u16(tag: u16) -> Option<Self> {
        match tag {
            0 => Some(Self::Null),
            1 => Some(Self::I8),
            2 => Some(Self::I16),
            3 => Some(Self::I32),
            4 => Some(Self::I64),
            5 => Some(Self::U8),
            6 => Some(Self::U16),
            7 => Some(Self::U32),
            8 => Some(Self::U64),
            9 => Some(Self::F32),
            10 => Some(Self::F64),
            11 => Some(Self::Bool),
            12 => Some(Self::Char),
            13 => Some(Self::Text),
            14 => Some(Self::Size),
            15 => Some(Self::Timestamp),
            16 => Some(Self::Duration),
            17 => Some(Self::Hex),
            18 => Some(Self::Oct),
            19 => Some(Self::Bin),
            20 => Some(Self::Bytes),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::I8 => "I8",
            Self::I16 => "I16",
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::U8 => "U8",
            Self::U16 => "U16",
            Self::U32 => "U32",
            Self::U64 => "U64",
            Self::F32 => "F32",
            Self::F64 => "F64",
            Self::Bool => "Bool",
            Self::Char => "Char",
            Self::Text => "Text",
            Self::Size => "Size",
            Self::Timestamp => "Timestamp",
            Self::Duration => "Duration",
            Self::Hex => "Hex",
            Self::Oct => "Oct",
            Self::Bin => "Bin",
            Self::Bytes => "Bytes",
        }
    }
}

/// Stable canonical variant tag used by hash/wire encodings.
#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Null => ValueTag::Null,
        Value::I8(_) => ValueTag::I8,
        Value::I16(_) => ValueTag::I16,
        Value::I32(_) => ValueTag::I32,
        Value::I64(_) => ValueTag::I64,
        Value::U8(_) => ValueTag::U8,
        Value::U16(_) => ValueTag::U16,
        Value::U32(_) => ValueTag::U32,
        Value::U64(_) => ValueTag::U64,
        Value::F32(_) => ValueTag::F32,
        Value::F64(_) => ValueTag::F64,
        Value::Bool(_) => ValueTag::Bool,
        Value::Char(_) => ValueTag::Char,
        Value::Text(_) => ValueTag::Text,
        Value::Size(_) => ValueTag::Size,
        Value::Timestamp(_) => ValueTag::Timestamp,
        Value::Duration(_) => ValueTag::Duration,
        Value::Hex(_) => ValueTag::Hex,
        Value::Oct(_) => ValueTag::Oct,
        Value::Bin(_) => ValueTag::Bin,
        Value::Bytes(_) => ValueTag::Bytes,
    }
}
