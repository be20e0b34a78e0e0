//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{io::Read, vec::Vec};

use thiserror::Error;

use super::{Message, Options, slice};

extern crate std;

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An error decoding the buffered message.
    #[error(transparent)]
    Decode(#[from] slice::Error),
}

/// Decode a complete message from a reader, publishing to a target.
///
/// The reader is drained to its end before decoding begins; a message is never
/// decoded from a partial buffer.
///
/// This method is also re-exported as `protowire::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode<M: Message>(r: &mut impl Read, o: &mut M) -> Result<(), Error> {
    decode_with(r, o, &Options::default())
}

/// Decode a complete message from a reader with explicit options.
pub fn decode_with<M: Message>(
    r: &mut impl Read,
    o: &mut M,
    options: &Options,
) -> Result<(), Error> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;

    slice::decode_with(&buf, o, options)?;

    Ok(())
}
