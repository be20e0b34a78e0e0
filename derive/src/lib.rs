use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod annotation;
mod message;
mod oneof;

#[proc_macro_derive(Message, attributes(protowire))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match message::expand_message(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(Oneof, attributes(protowire))]
pub fn derive_oneof(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match oneof::expand_oneof(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
