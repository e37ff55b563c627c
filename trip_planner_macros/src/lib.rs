//! Procedural macros for `trip-planner-rs`.

mod reply_schema;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `trip_planner_rs::schemas::ReplySchema`.
///
/// The type must also derive `schemars::JsonSchema`; its schema is generated
/// once and cached for the life of the process.
#[proc_macro_derive(ReplySchema)]
pub fn derive_reply_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    reply_schema::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
