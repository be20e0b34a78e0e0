//! Decoding into structures described by a schema.
//!
//! The functions in this module decode a complete buffer into a target
//! structure, publishing each field value through the [`Slot`] the structure
//! exposes for that field number.
//!
//! In most cases the field table can be derived. See the [`Message`](macro@Message)
//! and [`Oneof`](macro@Oneof) macros for details.

use alloc::{boxed::Box, vec::Vec};

pub mod bind;
#[cfg(feature = "std")]
pub mod reader;
pub mod schema;
pub mod slice;

pub use bind::{BindError, Slot};
#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use slice::{Context, Error, FieldError, decode as decode_slice, decode_with};

use schema::{Activate, Group};

/// Derive [`Message`] for a struct with named fields.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// Annotate each decoded field with `protowire(N, W, T, modifiers...)`, where
/// `N` is the field number, `W` the wire type ordinal, `T` the logical type
/// name and the optional modifiers any of `optional`, `repeated`, `packed` or
/// `oneof`. Every field must carry the attribute. Mark a field
/// `protowire(skip)` to leave it untouched by decoding.
///
/// ```
/// #[derive(Debug, Default, Message)]
/// struct SearchRequest {
///     #[protowire(1, 2, string)]
///     query: String,
///     #[protowire(2, 0, int32)]
///     page_number: i32,
///     #[protowire(3, 0, sint64, optional)]
///     offset: Option<i64>,
/// }
/// ```
///
/// Repeated fields must be stored in a `Vec<T>`. Scalars may be declared
/// `packed`, in which case the field declares wire type 2. Both packed and
/// unpacked occurrences are accepted on the wire for any repeated scalar.
///
/// ```
/// #[derive(Debug, Default, Message)]
/// struct Samples {
///     #[protowire(1, 2, fixed32, repeated, packed)]
///     readings: Vec<u32>,
///     #[protowire(2, 2, string, repeated)]
///     labels: Vec<String>,
/// }
/// ```
///
/// Embedded messages use the `embed` type. The field type must itself
/// implement [`Message`], optionally wrapped in `Option` or `Box`.
///
/// ```
/// #[derive(Debug, Default, Message)]
/// struct Tree {
///     #[protowire(1, 0, uint64)]
///     value: u64,
///     #[protowire(2, 2, embed, repeated)]
///     children: Vec<Tree>,
/// }
/// ```
///
/// To hold a oneof group, add `protowire(oneof)` to an `Option<T>` field,
/// where `T` derives [`Oneof`](macro@Oneof).
#[cfg(feature = "derive")]
pub use protowire_derive::Message;

/// Derive [`Oneof`] for an enum of mutually exclusive variants.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// Every variant carries exactly one field, annotated like a message field
/// with the `oneof` modifier.
///
/// ```
/// #[derive(Debug, Oneof)]
/// enum Contact {
///     #[protowire(3, 2, string, oneof)]
///     Email(String),
///     #[protowire(4, 0, uint64, oneof)]
///     Phone(u64),
/// }
///
/// #[derive(Debug, Default, Message)]
/// struct Person {
///     #[protowire(1, 2, string)]
///     name: String,
///     #[protowire(oneof)]
///     contact: Option<Contact>,
/// }
/// ```
///
/// Whichever variant appears last on the wire is the one left in the group.
#[cfg(feature = "derive")]
pub use protowire_derive::Oneof;

/// A structure that can be decoded from a message.
///
/// See the [`Message`](macro@Message) derive macro for an automatic
/// implementation of this trait.
pub trait Message: Sized {
    /// Describe the decoded fields of this structure.
    fn fields() -> Vec<FieldDescriptor<Self>>;

    /// Decode a new value from a complete buffer.
    fn from_slice(r: &[u8]) -> Result<Self, Error>
    where
        Self: Default,
    {
        let mut o = Self::default();
        slice::decode(r, &mut o)?;
        Ok(o)
    }
}

/// A group of mutually exclusive variants, each keyed by its own field number.
///
/// See the [`Oneof`](macro@Oneof) derive macro for an automatic implementation
/// of this trait.
pub trait Oneof: Sized {
    /// Describe every variant of this group.
    fn variants() -> Vec<Variant<Self>>;
}

/// One entry in the field table of a [`Message`].
pub struct FieldDescriptor<M> {
    pub name: &'static str,
    pub binding: Binding<M>,
}

impl<M> FieldDescriptor<M> {
    /// Describe a field stored directly on the message.
    ///
    /// The annotation follows the `number,wire_type,type[,modifier]*` form.
    pub fn field(
        name: &'static str,
        annotation: &'static str,
        access: fn(&mut M) -> &mut dyn Slot,
    ) -> Self {
        Self {
            name,
            binding: Binding::Field { annotation, access },
        }
    }

    /// Describe a oneof group, as built by [`oneof_group`].
    pub fn oneof(name: &'static str, variants: Vec<VariantBinding<M>>) -> Self {
        Self {
            name,
            binding: Binding::Oneof(variants),
        }
    }
}

/// Where the values of a described field are stored.
pub enum Binding<M> {
    Field {
        annotation: &'static str,
        access: fn(&mut M) -> &mut dyn Slot,
    },
    Oneof(Vec<VariantBinding<M>>),
}

/// One variant of a [`Oneof`] group.
pub struct Variant<O> {
    pub name: &'static str,
    pub annotation: &'static str,
    /// Construct the variant holding a default value.
    pub new: fn() -> O,
    /// Retrieve the variant's sole field, if `O` holds this variant.
    pub field: fn(&mut O) -> Option<&mut dyn Slot>,
}

impl<O> Variant<O> {
    pub fn new(
        name: &'static str,
        annotation: &'static str,
        new: fn() -> O,
        field: fn(&mut O) -> Option<&mut dyn Slot>,
    ) -> Self {
        Self {
            name,
            annotation,
            new,
            field,
        }
    }
}

/// A oneof variant bound to the group slot of a message.
pub struct VariantBinding<M> {
    pub name: &'static str,
    pub annotation: &'static str,
    pub(crate) activate: Box<dyn Activate<M>>,
}

/// Bind every variant of a oneof group to the slot selecting it in a message.
pub fn oneof_group<M: 'static, O: Oneof + 'static>(
    slot: fn(&mut M) -> &mut Option<O>,
) -> Vec<VariantBinding<M>> {
    O::variants()
        .into_iter()
        .map(|variant| VariantBinding {
            name: variant.name,
            annotation: variant.annotation,
            activate: Box::new(Group {
                name: variant.name,
                slot,
                new: variant.new,
                field: variant.field,
            }),
        })
        .collect()
}

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct Options {
    /// Deepest permitted nesting of embedded messages.
    pub recursion_limit: usize,
}

impl Options {
    pub const DEFAULT_RECURSION_LIMIT: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            recursion_limit: Self::DEFAULT_RECURSION_LIMIT,
        }
    }
}
