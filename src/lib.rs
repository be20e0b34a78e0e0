#![no_std]

//! A schema-driven decoder for the Protocol Buffers binary wire format.
//!
//! Protowire reconstructs the fields of a structure from an encoded message by
//! walking the buffer tag by tag, matching each field number against a table
//! declared on the structure itself, and storing the decoded value in place.
//! There is no `.proto` front end: the schema is the annotated structure.
//!
//! Most users should begin with the function and derive macros in the
//! [`avec`] module. Applications needing to walk a buffer by hand can use the
//! wire primitives in the [`sans`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based decoder (default).

extern crate alloc;

pub mod avec;
pub mod sans;

pub use avec::decode_slice as decode;

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec::Vec;
}
