//! Field annotations and the per-message schema built from them.

use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString},
};
use core::str::FromStr;

use thiserror::Error;

use crate::sans::{
    tag::FieldNumber,
    types::{LogicalType, Modifiers, WireType},
};

use super::{
    Binding, Message,
    bind::{BindError, Slot},
    slice::FieldError,
};

/// A parsed field annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation {
    pub number: FieldNumber,
    pub wire_type: WireType,
    pub ty: LogicalType,
    pub modifiers: Modifiers,
}

impl Annotation {
    /// Whether a value of the given wire type may be decoded into this field.
    ///
    /// A repeated scalar accepts both its element's wire type and a packed run.
    pub fn accepts(&self, wire_type: WireType) -> bool {
        if wire_type == self.wire_type {
            return true;
        }

        let element = self.ty.wire_type();

        self.modifiers.repeated()
            && element.is_packable()
            && (wire_type == element || wire_type == WireType::LengthDelimited)
    }
}

/// An error parsing a field annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("Malformed annotation `{0}`.")]
    Malformed(String),
    #[error("Field number {0} is outside 1..=536870911.")]
    InvalidFieldNumber(u64),
    #[error("Wire type {0} is not supported.")]
    InvalidWireType(u64),
    #[error("Unknown logical type `{0}`.")]
    UnknownLogicalType(String),
    #[error("Unknown modifier `{0}`.")]
    UnknownModifier(String),
    #[error("Modifier `packed` requires `repeated`.")]
    PackedWithoutRepeated,
    #[error("Modifiers `oneof` and `repeated` are exclusive.")]
    OneofWithRepeated,
    #[error("Logical type `{0}` cannot be packed.")]
    NotPackable(LogicalType),
    #[error("Wire type {declared:?} does not match logical type `{ty}`.")]
    WireTypeMismatch { declared: WireType, ty: LogicalType },
}

impl FromStr for Annotation {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AnnotationError::Malformed(s.to_string());

        let mut tokens = s.split(',').map(str::trim);

        let (Some(number), Some(wire_type), Some(ty)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            Err(malformed())?
        };

        let number = number.parse::<u64>().map_err(|_| malformed())?;
        let number = FieldNumber::new(number).ok_or(AnnotationError::InvalidFieldNumber(number))?;

        let wire_type = wire_type.parse::<u64>().map_err(|_| malformed())?;
        let wire_type =
            WireType::from_ordinal(wire_type).ok_or(AnnotationError::InvalidWireType(wire_type))?;

        let ty = LogicalType::from_str(ty)
            .map_err(|_| AnnotationError::UnknownLogicalType(ty.to_string()))?;

        let mut modifiers = Modifiers::default();
        for token in tokens {
            if !modifiers.insert(token) {
                Err(AnnotationError::UnknownModifier(token.to_string()))?;
            }
        }

        if modifiers.packed() && !modifiers.repeated() {
            Err(AnnotationError::PackedWithoutRepeated)?;
        }

        if modifiers.oneof() && modifiers.repeated() {
            Err(AnnotationError::OneofWithRepeated)?;
        }

        let element = ty.wire_type();

        if modifiers.packed() {
            if !element.is_packable() {
                Err(AnnotationError::NotPackable(ty))?;
            }

            // A packed field may declare either the run or its element.
            if wire_type != WireType::LengthDelimited && wire_type != element {
                Err(AnnotationError::WireTypeMismatch {
                    declared: wire_type,
                    ty,
                })?;
            }
        } else if wire_type != element {
            Err(AnnotationError::WireTypeMismatch {
                declared: wire_type,
                ty,
            })?;
        }

        Ok(Self {
            number,
            wire_type,
            ty,
            modifiers,
        })
    }
}

/// An error building the schema of a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field carries an invalid annotation.
    #[error("Field `{field}`: {source}")]
    Annotation {
        field: &'static str,
        source: AnnotationError,
    },
    /// Two fields claim the same field number.
    #[error("Fields `{first}` and `{second}` share field number {number}.")]
    DuplicateFieldNumber {
        number: FieldNumber,
        first: &'static str,
        second: &'static str,
    },
    /// A oneof variant's field lacks the `oneof` modifier.
    #[error("Oneof variant `{variant}` must carry the `oneof` modifier.")]
    MissingOneofModifier { variant: &'static str },
    /// A oneof variant does not expose exactly one field.
    #[error("Oneof variant `{variant}` must hold exactly one field.")]
    VariantShape { variant: &'static str },
}

/// The metadata of a field stored directly on a message.
pub struct FieldMetadata<M> {
    pub name: &'static str,
    pub annotation: Annotation,
    access: fn(&mut M) -> &mut dyn Slot,
}

impl<M> FieldMetadata<M> {
    /// The storage of this field within a message.
    pub fn slot<'m>(&self, o: &'m mut M) -> &'m mut dyn Slot {
        (self.access)(o)
    }
}

/// The metadata of one variant of a oneof group.
pub struct OneofMetadata<M> {
    pub group: &'static str,
    pub variant: &'static str,
    pub annotation: Annotation,
    activate: Box<dyn Activate<M>>,
}

impl<M> OneofMetadata<M> {
    /// Decode into a fresh value of this variant, then make it the group's
    /// selection.
    ///
    /// Returns the number of bytes `decode` reported.
    pub fn activate(
        &self,
        o: &mut M,
        mut decode: impl FnMut(&mut dyn Slot) -> Result<usize, FieldError>,
    ) -> Result<usize, FieldError> {
        self.activate.activate(o, &mut decode)
    }
}

/// A schema entry matched by a field number.
pub enum Entry<'s, M> {
    Field(&'s FieldMetadata<M>),
    Oneof(&'s OneofMetadata<M>),
}

/// The fields and oneof variants of a message, keyed by field number.
pub struct Schema<M> {
    fields: BTreeMap<FieldNumber, FieldMetadata<M>>,
    oneofs: BTreeMap<FieldNumber, OneofMetadata<M>>,
}

impl<M: Message> Schema<M> {
    /// Build the schema of a message from its field table.
    pub fn extract() -> Result<Self, SchemaError> {
        let mut fields = BTreeMap::new();
        let mut oneofs = BTreeMap::new();

        // Owner of each claimed field number.
        let mut claimed = BTreeMap::new();

        let mut claim = |number: FieldNumber, name: &'static str| match claimed.insert(number, name) {
            Some(first) => Err(SchemaError::DuplicateFieldNumber {
                number,
                first,
                second: name,
            }),
            None => Ok(()),
        };

        for descriptor in M::fields() {
            match descriptor.binding {
                Binding::Field { annotation, access } => {
                    let annotation = parse(descriptor.name, annotation)?;
                    claim(annotation.number, descriptor.name)?;

                    fields.insert(
                        annotation.number,
                        FieldMetadata {
                            name: descriptor.name,
                            annotation,
                            access,
                        },
                    );
                }
                Binding::Oneof(variants) => {
                    for variant in variants {
                        let annotation = parse(variant.name, variant.annotation)?;

                        if !annotation.modifiers.oneof() {
                            Err(SchemaError::MissingOneofModifier {
                                variant: variant.name,
                            })?;
                        }

                        if !variant.activate.is_well_formed() {
                            Err(SchemaError::VariantShape {
                                variant: variant.name,
                            })?;
                        }

                        claim(annotation.number, variant.name)?;

                        oneofs.insert(
                            annotation.number,
                            OneofMetadata {
                                group: descriptor.name,
                                variant: variant.name,
                                annotation,
                                activate: variant.activate,
                            },
                        );
                    }
                }
            }
        }

        log::debug!(
            "Extracted schema for `{}` ({} fields, {} oneof variants).",
            core::any::type_name::<M>(),
            fields.len(),
            oneofs.len(),
        );

        Ok(Self { fields, oneofs })
    }
}

impl<M> Schema<M> {
    pub fn lookup(&self, number: FieldNumber) -> Option<Entry<'_, M>> {
        if let Some(field) = self.fields.get(&number) {
            Some(Entry::Field(field))
        } else {
            self.oneofs.get(&number).map(Entry::Oneof)
        }
    }

    /// Fields stored directly on the message, in field number order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldMetadata<M>> {
        self.fields.values()
    }

    /// Oneof variants of the message, in field number order.
    pub fn oneofs(&self) -> impl Iterator<Item = &OneofMetadata<M>> {
        self.oneofs.values()
    }
}

fn parse(field: &'static str, annotation: &str) -> Result<Annotation, SchemaError> {
    annotation
        .parse()
        .map_err(|source| SchemaError::Annotation { field, source })
}

/// Type-erased activation of one oneof variant within a message.
pub(crate) trait Activate<M> {
    fn activate(
        &self,
        o: &mut M,
        decode: &mut dyn FnMut(&mut dyn Slot) -> Result<usize, FieldError>,
    ) -> Result<usize, FieldError>;

    /// Whether a freshly constructed variant exposes its field.
    fn is_well_formed(&self) -> bool;
}

pub(crate) struct Group<M, O> {
    pub(crate) name: &'static str,
    pub(crate) slot: fn(&mut M) -> &mut Option<O>,
    pub(crate) new: fn() -> O,
    pub(crate) field: fn(&mut O) -> Option<&mut dyn Slot>,
}

impl<M, O> Activate<M> for Group<M, O> {
    fn activate(
        &self,
        o: &mut M,
        decode: &mut dyn FnMut(&mut dyn Slot) -> Result<usize, FieldError>,
    ) -> Result<usize, FieldError> {
        let mut value = (self.new)();
        let field = (self.field)(&mut value).ok_or(BindError::VariantShape(self.name))?;
        let n = decode(field)?;

        *(self.slot)(o) = Some(value);

        Ok(n)
    }

    fn is_well_formed(&self) -> bool {
        let mut value = (self.new)();
        (self.field)(&mut value).is_some()
    }
}
