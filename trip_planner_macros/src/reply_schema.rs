use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`ReplySchema` cannot be derived for generic types",
        ));
    }

    let ident = &input.ident;
    let name = LitStr::new(&ident.to_string(), ident.span());

    Ok(quote! {
        impl trip_planner_rs::schemas::ReplySchema for #ident {
            fn schema() -> &'static trip_planner_rs::schemas::SchemaHandle {
                static HANDLE: ::std::sync::OnceLock<trip_planner_rs::schemas::SchemaHandle> =
                    ::std::sync::OnceLock::new();
                HANDLE.get_or_init(|| trip_planner_rs::schemas::SchemaHandle::of::<#ident>(#name))
            }
        }
    })
}
