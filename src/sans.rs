//! Wire-format primitives that know nothing about a target structure.
//!
//! This module is intended for applications that need to walk a Protocol
//! Buffers buffer by hand. See [`crate::avec`] for decoding directly into a
//! structure described by a schema.
//!
//! # Architecture
//!
//! A buffer is walked with a [`Cursor`] state token. Advancing a cursor parses
//! the next tag and returns either a [`cursor::Pending`] token (a tag whose
//! value has not been read yet) or [`cursor::Done`] once the buffer is
//! exhausted. A pending value is left either by consuming the number of bytes
//! a value decoder reported, or by skipping it according to its wire type.
//!
//! The cursor never rewinds, and every transition only ever narrows the
//! remaining suffix of the buffer.
//!
//! Value decoders live in [`scalar`] (varint, fixed64 and fixed32 values) and
//! operate on the bytes immediately following a tag. Length-delimited payloads
//! need a target to be meaningful and are handled in [`crate::avec`].

use thiserror::Error;

pub mod cursor;
pub mod scalar;
pub mod tag;
pub mod types;
pub mod varint;

/// Entrypoint to the cursor state machine.
pub type Cursor<'a> = cursor::Cursor<'a>;

/// An error reading values from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// A varint did not terminate within ten bytes.
    #[error("Varint exceeds 64 bits.")]
    Overflow,
    /// The buffer ended before a value was complete.
    #[error("Unexpectedly reached the end of the buffer.")]
    Truncated,
    /// A tag was too large, named field zero, or used an unsupported wire type.
    #[error("Invalid tag ({0:#x}).")]
    InvalidTag(u64),
    /// A packed run of fixed-width values was not a multiple of the element size.
    #[error("Packed run of {len} bytes is not a multiple of {width}.")]
    MisalignedPackedRun { len: usize, width: usize },
    /// A scalar decoder was asked for a logical type it cannot produce.
    #[error("Logical type `{ty}` cannot be decoded from {wire:?} data.")]
    UnsupportedScalarType {
        ty: types::LogicalType,
        wire: types::WireType,
    },
}
