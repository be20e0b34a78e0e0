//! Storage slots receiving decoded field values.

use alloc::{boxed::Box, string::String, vec::Vec};
use core::any::type_name;

use thiserror::Error;

use crate::sans::{scalar::Scalar, types::LogicalType};

use super::slice::{Context, FieldError};

/// An error storing a decoded value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The slot cannot hold a scalar of this kind.
    #[error("Cannot store a `{found}` in a `{into}`.")]
    UnsupportedScalarType {
        found: &'static str,
        into: &'static str,
    },
    /// The slot cannot hold a length-delimited payload of this type.
    #[error("Cannot store a `{ty}` payload in a `{into}`.")]
    UnsupportedPayload {
        ty: LogicalType,
        into: &'static str,
    },
    /// A `string` payload bound to a `String` was not UTF-8.
    #[error("String payload is not valid UTF-8.")]
    InvalidUtf8,
    /// A oneof variant did not expose its field.
    #[error("Oneof variant `{0}` holds no field.")]
    VariantShape(&'static str),
}

/// Receive decoded values for one field.
///
/// Singular storage replaces its value on every call, except embedded
/// messages, which merge. Repeated storage appends.
///
/// The default implementation of each method rejects the value.
pub trait Slot {
    /// Store a value decoded from a varint, fixed64 or fixed32 field, or one
    /// element of a packed run.
    fn put_scalar(&mut self, value: Scalar) -> Result<(), BindError> {
        Err(BindError::UnsupportedScalarType {
            found: value.kind(),
            into: type_name::<Self>(),
        })
    }

    /// Store a `string` or `bytes` payload.
    fn put_bytes(&mut self, ty: LogicalType, _payload: &[u8]) -> Result<(), BindError> {
        Err(BindError::UnsupportedPayload {
            ty,
            into: type_name::<Self>(),
        })
    }

    /// Decode an embedded message payload into this slot.
    fn put_message(&mut self, _payload: &[u8], _cx: &Context<'_>) -> Result<(), FieldError> {
        Err(BindError::UnsupportedPayload {
            ty: LogicalType::Embed,
            into: type_name::<Self>(),
        }
        .into())
    }
}

macro_rules! scalar_slot {
    ($t:ty, $($variant:ident),+) => {
        impl Slot for $t {
            fn put_scalar(&mut self, value: Scalar) -> Result<(), BindError> {
                *self = match value {
                    $(Scalar::$variant(v) => v.into(),)+
                    value => Err(BindError::UnsupportedScalarType {
                        found: value.kind(),
                        into: stringify!($t),
                    })?,
                };

                Ok(())
            }
        }
    };
}

scalar_slot!(i32, I32);
scalar_slot!(i64, I64, I32);
scalar_slot!(u32, U32);
scalar_slot!(u64, U64, U32);
scalar_slot!(bool, Bool);
scalar_slot!(f32, F32);
scalar_slot!(f64, F64, F32);

impl Slot for String {
    fn put_bytes(&mut self, ty: LogicalType, payload: &[u8]) -> Result<(), BindError> {
        if ty != LogicalType::String {
            Err(BindError::UnsupportedPayload {
                ty,
                into: "String",
            })?;
        }

        let s = core::str::from_utf8(payload).map_err(|_| BindError::InvalidUtf8)?;

        self.clear();
        self.push_str(s);

        Ok(())
    }
}

/// Holds `bytes` payloads, and `string` payloads without validation.
impl Slot for Vec<u8> {
    fn put_bytes(&mut self, _ty: LogicalType, payload: &[u8]) -> Result<(), BindError> {
        self.clear();
        self.extend_from_slice(payload);

        Ok(())
    }
}

/// Present once any value has been received.
impl<T: Slot + Default> Slot for Option<T> {
    fn put_scalar(&mut self, value: Scalar) -> Result<(), BindError> {
        self.get_or_insert_with(T::default).put_scalar(value)
    }

    fn put_bytes(&mut self, ty: LogicalType, payload: &[u8]) -> Result<(), BindError> {
        self.get_or_insert_with(T::default).put_bytes(ty, payload)
    }

    fn put_message(&mut self, payload: &[u8], cx: &Context<'_>) -> Result<(), FieldError> {
        self.get_or_insert_with(T::default).put_message(payload, cx)
    }
}

impl<T: Slot + ?Sized> Slot for Box<T> {
    fn put_scalar(&mut self, value: Scalar) -> Result<(), BindError> {
        (**self).put_scalar(value)
    }

    fn put_bytes(&mut self, ty: LogicalType, payload: &[u8]) -> Result<(), BindError> {
        (**self).put_bytes(ty, payload)
    }

    fn put_message(&mut self, payload: &[u8], cx: &Context<'_>) -> Result<(), FieldError> {
        (**self).put_message(payload, cx)
    }
}

/// Repeated storage: every value becomes a new element.
impl<T: Slot + Default> Slot for Vec<T> {
    fn put_scalar(&mut self, value: Scalar) -> Result<(), BindError> {
        let mut item = T::default();
        item.put_scalar(value)?;
        self.push(item);

        Ok(())
    }

    fn put_bytes(&mut self, ty: LogicalType, payload: &[u8]) -> Result<(), BindError> {
        let mut item = T::default();
        item.put_bytes(ty, payload)?;
        self.push(item);

        Ok(())
    }

    fn put_message(&mut self, payload: &[u8], cx: &Context<'_>) -> Result<(), FieldError> {
        let mut item = T::default();
        item.put_message(payload, cx)?;
        self.push(item);

        Ok(())
    }
}
