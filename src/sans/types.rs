//! Wire types, logical field types, and field modifiers.

use core::{fmt, str::FromStr};

use tartan_bitfield::bitfield;

/// How a value is physically laid out after its tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WireType {
    /// Base-128 varint.
    Varint = 0,
    /// Eight little-endian bytes.
    Fixed64 = 1,
    /// Varint length prefix followed by that many bytes.
    LengthDelimited = 2,
    /// Four little-endian bytes.
    Fixed32 = 5,
}

impl WireType {
    /// Look up a wire type by its ordinal.
    ///
    /// Group start and end (3 and 4) are not supported, and 6 and 7 are
    /// unassigned.
    pub fn from_ordinal(ordinal: u64) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }

    /// Whether values of this wire type may be concatenated into a packed run.
    pub fn is_packable(self) -> bool {
        matches!(self, Self::Varint | Self::Fixed32 | Self::Fixed64)
    }
}

/// The declared protobuf type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Bool,
    Enum,
    Fixed64,
    Sfixed64,
    Double,
    String,
    Bytes,
    /// An embedded message.
    Embed,
    Fixed32,
    Sfixed32,
    Float,
}

impl LogicalType {
    /// The wire type values of this logical type are encoded with.
    pub fn wire_type(self) -> WireType {
        match self {
            Self::Int32
            | Self::Int64
            | Self::Uint32
            | Self::Uint64
            | Self::Sint32
            | Self::Sint64
            | Self::Bool
            | Self::Enum => WireType::Varint,
            Self::Fixed64 | Self::Sfixed64 | Self::Double => WireType::Fixed64,
            Self::String | Self::Bytes | Self::Embed => WireType::LengthDelimited,
            Self::Fixed32 | Self::Sfixed32 | Self::Float => WireType::Fixed32,
        }
    }

    /// Whether varint values of this type are zigzag mapped.
    pub fn is_zigzag(self) -> bool {
        matches!(self, Self::Sint32 | Self::Sint64)
    }

    /// The name used for this type in field annotations.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Bool => "bool",
            Self::Enum => "enum",
            Self::Fixed64 => "fixed64",
            Self::Sfixed64 => "sfixed64",
            Self::Double => "double",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Embed => "embed",
            Self::Fixed32 => "fixed32",
            Self::Sfixed32 => "sfixed32",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An unrecognised logical type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogicalType;

impl FromStr for LogicalType {
    type Err = UnknownLogicalType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "sint32" => Self::Sint32,
            "sint64" => Self::Sint64,
            "bool" => Self::Bool,
            "enum" => Self::Enum,
            "fixed64" => Self::Fixed64,
            "sfixed64" => Self::Sfixed64,
            "double" => Self::Double,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "embed" | "message" => Self::Embed,
            "fixed32" => Self::Fixed32,
            "sfixed32" => Self::Sfixed32,
            "float" => Self::Float,
            _ => Err(UnknownLogicalType)?,
        })
    }
}

bitfield! {
    /// The modifier set of a field annotation.
    ///
    /// An empty set behaves as `optional`.
    pub struct Modifiers(u8) {
        [0] pub optional,
        [1] pub repeated,
        [2] pub packed,
        [3] pub oneof,
    }
}

impl Modifiers {
    /// Add a modifier by its annotation token.
    ///
    /// Returns `false` if the token is not a known modifier.
    pub fn insert(&mut self, token: &str) -> bool {
        match token {
            "optional" => self.set_optional(true),
            "repeated" => self.set_repeated(true),
            "packed" => self.set_packed(true),
            "oneof" => self.set_oneof(true),
            _ => return false,
        }

        true
    }
}
