//! Field tags: a field number and a wire type packed into one varint.

use core::fmt;

use super::{WireError, types::WireType, varint::read_varint};

/// Identifies a field within one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldNumber(u32);

impl FieldNumber {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = (1 << 29) - 1;

    /// Construct a field number, if it lies within the valid range.
    pub fn new(n: u64) -> Option<Self> {
        if (u64::from(Self::MIN)..=u64::from(Self::MAX)).contains(&n) {
            Some(Self(n as u32))
        } else {
            None
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FieldNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A parsed field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub number: FieldNumber,
    pub wire_type: WireType,
}

/// Parse a tag from the front of a buffer.
///
/// Returns the tag and the number of bytes it occupied.
pub fn parse_tag(r: &[u8]) -> Result<(Tag, usize), WireError> {
    let (raw, n) = read_varint(r)?;

    // Field number and wire type must jointly fit 32 bits.
    if raw > u64::from(u32::MAX) {
        Err(WireError::InvalidTag(raw))?;
    }

    let wire_type = WireType::from_ordinal(raw & 0x7).ok_or(WireError::InvalidTag(raw))?;
    let number = FieldNumber::new(raw >> 3).ok_or(WireError::InvalidTag(raw))?;

    Ok((Tag { number, wire_type }, n))
}
