//! States walking a buffer tag by tag.

use either::Either::{self, Left, Right};

use super::{
    WireError,
    tag::{Tag, parse_tag},
    types::WireType,
    varint::read_varint,
};

/// State token holding the undecoded suffix of a buffer.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    rest: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(r: &'a [u8]) -> Self {
        Self { rest: r }
    }

    /// Bytes not yet decoded.
    pub fn remaining(&self) -> &'a [u8] {
        self.rest
    }

    /// Transition to another state by parsing the next tag.
    ///
    /// Returns a token for the tag's pending value, or [`Done`] if the buffer
    /// is exhausted.
    pub fn advance(self) -> Result<Either<Pending<'a>, Done>, WireError> {
        if self.rest.is_empty() {
            return Ok(Right(Done(())));
        }

        let (tag, n) = parse_tag(self.rest)?;

        Ok(Left(Pending {
            tag,
            rest: &self.rest[n..],
        }))
    }
}

/// State token for a tag whose value has not been read.
#[derive(Debug)]
pub struct Pending<'a> {
    tag: Tag,
    rest: &'a [u8],
}

impl<'a> Pending<'a> {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Bytes following the tag, starting with its value.
    pub fn value(&self) -> &'a [u8] {
        self.rest
    }

    /// Transition past a value that was decoded from [`Self::value`], given
    /// the number of bytes it occupied.
    pub fn consume(self, n: usize) -> Result<Cursor<'a>, WireError> {
        let rest = self.rest.get(n..).ok_or(WireError::Truncated)?;
        Ok(Cursor { rest })
    }

    /// Transition past the value without interpreting it, using the length
    /// rule of its wire type.
    pub fn skip(self) -> Result<Cursor<'a>, WireError> {
        let n = match self.tag.wire_type {
            WireType::Varint => read_varint(self.rest)?.1,
            WireType::Fixed64 => 8,
            WireType::Fixed32 => 4,
            WireType::LengthDelimited => {
                let (len, n) = read_varint(self.rest)?;
                let len = usize::try_from(len).map_err(|_| WireError::Truncated)?;
                n.checked_add(len).ok_or(WireError::Truncated)?
            }
        };

        self.consume(n)
    }
}

/// State token for an exhausted buffer.
#[derive(Debug)]
pub struct Done(pub(super) ());
