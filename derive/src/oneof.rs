use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Ident, Result, Variant, ext::IdentExt};

use crate::annotation::{self, Annotation};

pub(crate) fn expand_oneof(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`Oneof` may only be derived on enums.",
        ))?
    };

    let variants = data
        .variants
        .iter()
        .map(VariantMetadata::parse)
        .collect::<Result<Vec<_>>>()?;

    let entries = variants.iter().map(|variant| {
        let VariantMetadata {
            name,
            field,
            annotation,
        } = variant;

        let label = name.unraw().to_string();
        let annotation = annotation.render();

        let (construct, pattern) = match field {
            Some(field) => (
                quote! { Self::#name { #field: ::core::default::Default::default() } },
                quote! { Self::#name { #field: value } },
            ),
            None => (
                quote! { Self::#name(::core::default::Default::default()) },
                quote! { Self::#name(value) },
            ),
        };

        quote! {
            ::protowire::avec::Variant::<Self>::new(
                #label,
                #annotation,
                || #construct,
                |o| match o {
                    #pattern => ::core::option::Option::Some(
                        value as &mut dyn ::protowire::avec::Slot,
                    ),
                    _ => ::core::option::Option::None,
                },
            )
        }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::protowire::avec::Oneof for #name #ty_generics #where_clause {
            #[allow(unreachable_patterns)]
            fn variants() -> ::protowire::__private::Vec<::protowire::avec::Variant<Self>> {
                let mut variants = ::protowire::__private::Vec::new();
                #(variants.push(#entries);)*
                variants
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct VariantMetadata {
    name: Ident,
    /// Name of the sole field, if the variant is struct-like.
    field: Option<Ident>,
    annotation: Annotation,
}

impl VariantMetadata {
    fn parse(variant: &Variant) -> Result<Self> {
        let name = variant.ident.clone();

        let fields = match &variant.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unnamed(fields) => &fields.unnamed,
            Fields::Unit => Err(Error::new_spanned(
                variant,
                "Oneof variants must hold exactly one field.",
            ))?,
        };

        if fields.len() != 1 {
            Err(Error::new_spanned(
                variant,
                "Oneof variants must hold exactly one field.",
            ))?
        }

        let field = fields[0].ident.clone();

        let Some(attr) = annotation::find(&variant.attrs) else {
            Err(Error::new_spanned(
                variant,
                "Oneof variants must have a `protowire` attribute.",
            ))?
        };

        let annotation = attr.meta.require_list()?.parse_args::<Annotation>()?;

        Ok(Self {
            name,
            field,
            annotation,
        })
    }
}
