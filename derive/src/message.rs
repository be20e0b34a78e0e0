use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, Ident, Result, Type,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

use crate::annotation::{self, Annotation};

pub(crate) fn expand_message(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`Message` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`Message` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields marked `skip`.
        .collect::<Result<Vec<_>>>()?;

    let mut numbers = HashSet::new();

    for field in &fields {
        if let FieldKind::Field(annotation) = &field.kind {
            if !numbers.insert(annotation.number.base10_digits().to_string()) {
                Err(Error::new_spanned(
                    &annotation.number,
                    "Field numbers must be unique.",
                ))?
            }
        }
    }

    let descriptors = fields.iter().map(|field| {
        let FieldMetadata { name, kind } = field;
        let label = name.unraw().to_string();

        match kind {
            FieldKind::Field(annotation) => {
                let annotation = annotation.render();

                quote! {
                    ::protowire::avec::FieldDescriptor::<Self>::field(
                        #label,
                        #annotation,
                        |m| &mut m.#name,
                    )
                }
            }
            FieldKind::Group(inner) => quote! {
                ::protowire::avec::FieldDescriptor::<Self>::oneof(
                    #label,
                    ::protowire::avec::oneof_group::<Self, #inner>(|m| &mut m.#name),
                )
            },
        }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::protowire::avec::Message for #name #ty_generics #where_clause {
            fn fields() -> ::protowire::__private::Vec<::protowire::avec::FieldDescriptor<Self>> {
                let mut fields = ::protowire::__private::Vec::new();
                #(fields.push(#descriptors);)*
                fields
            }
        }

        impl #impl_generics ::protowire::avec::Slot for #name #ty_generics #where_clause {
            fn put_message(
                &mut self,
                payload: &[u8],
                cx: &::protowire::avec::Context<'_>,
            ) -> ::core::result::Result<(), ::protowire::avec::FieldError> {
                cx.decode(payload, self)
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    kind: FieldKind,
}

#[derive(Debug)]
enum FieldKind {
    /// A field stored directly on the message.
    Field(Annotation),
    /// A oneof group, holding the type implementing `Oneof`.
    Group(Type),
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let Some(attr) = annotation::find(&field.attrs) else {
            Err(Error::new_spanned(
                field,
                "Field must have a `protowire` attribute, or `protowire(skip)`.",
            ))?
        };

        let kind = match attr.meta.require_list()?.parse_args::<FieldAttribute>()? {
            FieldAttribute::Skip => return Ok(None),
            FieldAttribute::Group => {
                FieldKind::Group(annotation::unwrap_generic(&field.ty, "Option")?.clone())
            }
            FieldAttribute::Field(annotation) => {
                if annotation.has_modifier("repeated") {
                    annotation::unwrap_generic(&field.ty, "Vec")?;
                }

                FieldKind::Field(annotation)
            }
        };

        Ok(Some(Self { name, kind }))
    }
}

#[derive(Debug)]
enum FieldAttribute {
    Skip,
    Group,
    Field(Annotation),
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(Ident::peek_any) {
            let ident = input.call(Ident::parse_any)?;

            if !input.is_empty() {
                Err(Error::new_spanned(
                    &ident,
                    "Field attribute must be `oneof`, `skip`, or begin with a field number.",
                ))?
            }

            return match ident.to_string().as_str() {
                "oneof" => Ok(Self::Group),
                "skip" => Ok(Self::Skip),
                _ => Err(Error::new_spanned(
                    ident,
                    "Field attribute must be `oneof`, `skip`, or begin with a field number.",
                )),
            };
        }

        Ok(Self::Field(input.parse()?))
    }
}
