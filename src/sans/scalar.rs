//! Decoders for varint, fixed64 and fixed32 values.
//!
//! Each decoder reads the raw bits of one value and interprets them according
//! to the field's [`LogicalType`], yielding a [`Scalar`].

use zerocopy::{
    FromBytes,
    byteorder::little_endian::{U32, U64},
};

use super::{
    WireError,
    types::{LogicalType, WireType},
    varint::{read_varint, zigzag_decode_32, zigzag_decode_64},
};

/// A decoded scalar value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Bool(bool),
    F32(f32),
    F64(f64),
}

impl Scalar {
    /// The Rust primitive this value holds.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::Bool(_) => "bool",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
        }
    }
}

/// Read a varint and interpret it as a value of the given type.
pub fn decode_varint_scalar(ty: LogicalType, r: &[u8]) -> Result<(Scalar, usize), WireError> {
    let (v, n) = read_varint(r)?;
    Ok((varint_scalar(ty, v)?, n))
}

/// Read eight little-endian bytes and interpret them as a value of the given type.
pub fn decode_fixed64_scalar(ty: LogicalType, r: &[u8]) -> Result<(Scalar, usize), WireError> {
    let (v, _) = U64::read_from_prefix(r).map_err(|_| WireError::Truncated)?;
    Ok((fixed64_scalar(ty, v.get())?, size_of::<U64>()))
}

/// Read four little-endian bytes and interpret them as a value of the given type.
pub fn decode_fixed32_scalar(ty: LogicalType, r: &[u8]) -> Result<(Scalar, usize), WireError> {
    let (v, _) = U32::read_from_prefix(r).map_err(|_| WireError::Truncated)?;
    Ok((fixed32_scalar(ty, v.get())?, size_of::<U32>()))
}

/// Interpret the bits of a varint.
///
/// Wider types are truncated to their declared width, and `sint` types undo
/// the zigzag mapping at that width.
pub fn varint_scalar(ty: LogicalType, v: u64) -> Result<Scalar, WireError> {
    Ok(match ty {
        LogicalType::Int32 | LogicalType::Enum => Scalar::I32(v as i32),
        LogicalType::Int64 => Scalar::I64(v as i64),
        LogicalType::Uint32 => Scalar::U32(v as u32),
        LogicalType::Uint64 => Scalar::U64(v),
        LogicalType::Sint32 => Scalar::I32(zigzag_decode_32(v as u32)),
        LogicalType::Sint64 => Scalar::I64(zigzag_decode_64(v)),
        LogicalType::Bool => Scalar::Bool(v & 1 == 1),
        ty => Err(mismatch(ty, WireType::Varint))?,
    })
}

/// Interpret the bits of a fixed64 value.
pub fn fixed64_scalar(ty: LogicalType, v: u64) -> Result<Scalar, WireError> {
    Ok(match ty {
        LogicalType::Fixed64 => Scalar::U64(v),
        LogicalType::Sfixed64 => Scalar::I64(v as i64),
        LogicalType::Double => Scalar::F64(f64::from_bits(v)),
        ty => Err(mismatch(ty, WireType::Fixed64))?,
    })
}

/// Interpret the bits of a fixed32 value.
pub fn fixed32_scalar(ty: LogicalType, v: u32) -> Result<Scalar, WireError> {
    Ok(match ty {
        LogicalType::Fixed32 => Scalar::U32(v),
        LogicalType::Sfixed32 => Scalar::I32(v as i32),
        LogicalType::Float => Scalar::F32(f32::from_bits(v)),
        ty => Err(mismatch(ty, WireType::Fixed32))?,
    })
}

fn mismatch(ty: LogicalType, wire: WireType) -> WireError {
    WireError::UnsupportedScalarType { ty, wire }
}
