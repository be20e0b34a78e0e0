//! Slice-based decoder implementation.

use alloc::boxed::Box;

use either::Either::{Left, Right};
use thiserror::Error;
use zerocopy::{
    FromBytes,
    byteorder::little_endian::{U32, U64},
};

use crate::sans::{
    Cursor, WireError,
    scalar::{
        decode_fixed32_scalar, decode_fixed64_scalar, decode_varint_scalar, fixed32_scalar,
        fixed64_scalar,
    },
    tag::{FieldNumber, Tag},
    types::{LogicalType, WireType},
    varint::read_varint,
};

use super::{
    Message, Options,
    bind::{BindError, Slot},
    schema::{Annotation, Entry, Schema, SchemaError},
};

/// Errors occurring while decoding from a slice.
#[derive(Debug, Error)]
pub enum Error {
    /// The target's field table is invalid.
    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),
    /// A tag could not be parsed.
    #[error("Invalid tag at offset {offset}: {source}")]
    Tag { offset: usize, source: WireError },
    /// A field value could not be decoded or stored.
    #[error("Field {number} ({wire_type:?}): {source}")]
    Field {
        number: FieldNumber,
        wire_type: WireType,
        source: FieldError,
    },
}

/// The cause of an [`Error::Field`].
#[derive(Debug, Error)]
pub enum FieldError {
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error(transparent)]
    Bind(#[from] BindError),
    /// The wire type on the buffer differs from the declared one.
    #[error("Expected wire type {declared:?}.")]
    WireTypeMismatch { declared: WireType },
    #[error("Logical type `{0}` cannot be length-delimited.")]
    UnsupportedLengthDelimitedType(LogicalType),
    #[error("Embedded messages nest deeper than {0} levels.")]
    RecursionLimit(usize),
    #[error("Embedded message: {0}")]
    Embedded(#[source] Box<Error>),
}

/// Nesting state of an in-progress decode.
#[derive(Debug, Clone, Copy)]
pub struct Context<'o> {
    options: &'o Options,
    depth: usize,
}

impl<'o> Context<'o> {
    /// How many embedded messages enclose the one being decoded.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Decode an embedded message payload into a target.
    pub fn decode<M: Message>(&self, r: &[u8], o: &mut M) -> Result<(), FieldError> {
        decode_at(r, o, self).map_err(|err| FieldError::Embedded(Box::new(err)))
    }

    fn nested(&self) -> Result<Context<'o>, FieldError> {
        let limit = self.options.recursion_limit;

        if self.depth >= limit {
            log::warn!("Embedded messages nest deeper than {limit} levels.");
            Err(FieldError::RecursionLimit(limit))?;
        }

        Ok(Context {
            options: self.options,
            depth: self.depth + 1,
        })
    }
}

/// Decode a complete message from a slice, publishing to a target.
///
/// This method is also re-exported as `protowire::avec::decode_slice`.
///
/// On error the target holds whichever fields were stored before the failure,
/// and should be discarded.
pub fn decode<M: Message>(r: &[u8], o: &mut M) -> Result<(), Error> {
    decode_with(r, o, &Options::default())
}

/// Decode a complete message from a slice with explicit options.
pub fn decode_with<M: Message>(r: &[u8], o: &mut M, options: &Options) -> Result<(), Error> {
    decode_at(r, o, &Context { options, depth: 0 })
}

fn decode_at<M: Message>(r: &[u8], o: &mut M, cx: &Context<'_>) -> Result<(), Error> {
    let schema = Schema::<M>::extract()?;

    let mut cursor = Cursor::new(r);

    loop {
        let offset = r.len() - cursor.remaining().len();

        let pending = match cursor.advance() {
            Ok(Left(pending)) => pending,
            Ok(Right(_)) => break,
            Err(source) => Err(Error::Tag { offset, source })?,
        };

        let Tag { number, wire_type } = pending.tag();
        let context = |source: FieldError| Error::Field {
            number,
            wire_type,
            source,
        };

        let value = pending.value();

        cursor = match schema.lookup(number) {
            Some(Entry::Field(field)) => {
                let slot = field.slot(o);
                let n = decode_value(&field.annotation, wire_type, value, slot, cx)
                    .map_err(context)?;
                pending.consume(n)
            }
            Some(Entry::Oneof(variant)) => {
                let n = variant
                    .activate(o, |slot| {
                        decode_value(&variant.annotation, wire_type, value, slot, cx)
                    })
                    .map_err(context)?;
                pending.consume(n)
            }
            None => {
                log::trace!("Skipping unknown field {number} ({wire_type:?}).");
                pending.skip()
            }
        }
        .map_err(|err| context(err.into()))?;
    }

    Ok(())
}

/// Decode one value following a tag into a slot.
///
/// Returns the number of bytes the value occupied.
fn decode_value(
    annotation: &Annotation,
    wire_type: WireType,
    r: &[u8],
    slot: &mut dyn Slot,
    cx: &Context<'_>,
) -> Result<usize, FieldError> {
    if !annotation.accepts(wire_type) {
        Err(FieldError::WireTypeMismatch {
            declared: annotation.wire_type,
        })?;
    }

    let (value, n) = match wire_type {
        WireType::Varint => decode_varint_scalar(annotation.ty, r)?,
        WireType::Fixed64 => decode_fixed64_scalar(annotation.ty, r)?,
        WireType::Fixed32 => decode_fixed32_scalar(annotation.ty, r)?,
        WireType::LengthDelimited => return decode_length_delimited(annotation, r, slot, cx),
    };

    slot.put_scalar(value)?;

    Ok(n)
}

/// Decode a length-delimited value into a slot, as a string, bytes, an
/// embedded message, or a packed run of scalars.
///
/// Returns the number of bytes the length prefix and payload occupied.
pub fn decode_length_delimited(
    annotation: &Annotation,
    r: &[u8],
    slot: &mut dyn Slot,
    cx: &Context<'_>,
) -> Result<usize, FieldError> {
    let (len, n) = read_varint(r)?;

    let payload = usize::try_from(len)
        .ok()
        .and_then(|len| r.get(n..)?.get(..len))
        .ok_or(WireError::Truncated)?;

    match annotation.ty {
        ty @ (LogicalType::String | LogicalType::Bytes) => slot.put_bytes(ty, payload)?,
        LogicalType::Embed => slot.put_message(payload, &cx.nested()?)?,
        ty if annotation.modifiers.repeated() && ty.wire_type().is_packable() => {
            decode_packed(ty, payload, slot)?
        }
        ty => Err(FieldError::UnsupportedLengthDelimitedType(ty))?,
    }

    Ok(n + payload.len())
}

/// Decode every element of a packed run, appending each to a slot.
fn decode_packed(ty: LogicalType, payload: &[u8], slot: &mut dyn Slot) -> Result<(), FieldError> {
    let misaligned = |width| WireError::MisalignedPackedRun {
        len: payload.len(),
        width,
    };

    match ty.wire_type() {
        WireType::Varint => {
            let mut rest = payload;

            while !rest.is_empty() {
                let (value, n) = decode_varint_scalar(ty, rest)?;
                slot.put_scalar(value)?;
                rest = &rest[n..];
            }
        }
        WireType::Fixed64 => {
            let run = <[U64]>::ref_from_bytes(payload).map_err(|_| misaligned(size_of::<U64>()))?;

            for v in run {
                slot.put_scalar(fixed64_scalar(ty, v.get())?)?;
            }
        }
        WireType::Fixed32 => {
            let run = <[U32]>::ref_from_bytes(payload).map_err(|_| misaligned(size_of::<U32>()))?;

            for v in run {
                slot.put_scalar(fixed32_scalar(ty, v.get())?)?;
            }
        }
        WireType::LengthDelimited => Err(FieldError::UnsupportedLengthDelimitedType(ty))?,
    }

    Ok(())
}
