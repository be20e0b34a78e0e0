use syn::{
    Attribute, Error, GenericArgument, Ident, LitInt, PathArguments, Result, Token, Type,
    ext::IdentExt,
    parse::{Parse, ParseStream},
};

/// The `protowire(N, W, T, modifiers...)` attribute of a field.
///
/// Only the syntax is checked here. Ranges and modifier combinations are
/// validated when the schema is extracted at runtime.
#[derive(Debug)]
pub(crate) struct Annotation {
    pub(crate) number: LitInt,
    wire_type: LitInt,
    ty: Ident,
    modifiers: Vec<Ident>,
}

impl Annotation {
    pub(crate) fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// Render as the comma-separated annotation string read by the runtime.
    pub(crate) fn render(&self) -> String {
        let mut s = format!(
            "{},{},{}",
            self.number.base10_digits(),
            self.wire_type.base10_digits(),
            self.ty.unraw(),
        );

        for modifier in &self.modifiers {
            s.push(',');
            s.push_str(&modifier.unraw().to_string());
        }

        s
    }
}

impl Parse for Annotation {
    fn parse(input: ParseStream) -> Result<Self> {
        let number = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;
        let wire_type = input.parse::<LitInt>()?;
        input.parse::<Token![,]>()?;

        // Type names such as `enum` are keywords.
        let ty = input.call(Ident::parse_any)?;

        let mut modifiers = Vec::new();
        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            modifiers.push(input.call(Ident::parse_any)?);
        }

        Ok(Self {
            number,
            wire_type,
            ty,
            modifiers,
        })
    }
}

/// Find the `protowire` attribute among a field's or variant's attributes.
pub(crate) fn find(attrs: &[Attribute]) -> Option<&Attribute> {
    attrs.iter().find(|a| a.path().is_ident("protowire"))
}

/// Retrieve `T` from a type of the form `Wrapper<T>`.
pub(crate) fn unwrap_generic<'t>(ty: &'t Type, wrapper: &str) -> Result<&'t Type> {
    let Type::Path(path) = ty else {
        Err(Error::new_spanned(
            ty,
            format!("Field must have type `{wrapper}<T>`."),
        ))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(
            &path.path.segments,
            format!("Field must have type `{wrapper}<T>`."),
        ))?
    };

    if segment.ident != wrapper {
        Err(Error::new_spanned(
            &segment.ident,
            format!("Field must have type `{wrapper}<T>`."),
        ))?
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(
            &segment.arguments,
            format!("Field of type `{wrapper}<T>` must have a generic parameter."),
        ))?
    };

    let Some(GenericArgument::Type(inner)) = arguments.args.first() else {
        Err(Error::new_spanned(
            &arguments.args,
            format!("Generic argument of a field of type `{wrapper}<T>` must be a type."),
        ))?
    };

    Ok(inner)
}
