//! A set of convenience macros for our wasmbed-c-api crate.
//!
//! These are intended to mirror the `WASM_DECLARE_OWN` and `WASM_DECLARE_TYPE`
//! macros in the `wasm.h` header file.

use proc_macro2::{Ident, TokenStream, TokenTree};
use quote::{format_ident, quote};

fn extract_ident(input: proc_macro::TokenStream) -> Ident {
    let input = TokenStream::from(input);
    let i = match input.into_iter().next().unwrap() {
        TokenTree::Ident(i) => i,
        _ => panic!("expected an ident"),
    };
    let name = i.to_string();
    assert!(name.ends_with("_t"));
    i
}

fn prefix(ty: &Ident) -> String {
    let name = ty.to_string();
    name[..name.len() - 2].to_string()
}

/// Generates `<name>_delete`, taking ownership of a boxed value.
#[proc_macro]
pub fn declare_own(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ty = extract_ident(input);
    let prefix = prefix(&ty);
    let delete = format_ident!("{}_delete", prefix);
    let docs = format!("Deletes the [`{ty}`].");

    (quote! {
        #[doc = #docs]
        #[unsafe(no_mangle)]
        pub extern "C" fn #delete(_: ::std::boxed::Box<#ty>) {}
    })
    .into()
}

/// Same as `declare_own!` plus `<name>_copy`, requiring `Clone`.
#[proc_macro]
pub fn declare_ty(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ty = extract_ident(input);
    let prefix = prefix(&ty);
    let delete = format_ident!("{}_delete", prefix);
    let copy = format_ident!("{}_copy", prefix);
    let delete_docs = format!("Deletes the [`{ty}`].");
    let copy_docs = format!("Creates a new [`{ty}`] which matches the provided one.");

    (quote! {
        #[doc = #delete_docs]
        #[unsafe(no_mangle)]
        pub extern "C" fn #delete(_: ::std::boxed::Box<#ty>) {}

        #[doc = #copy_docs]
        #[unsafe(no_mangle)]
        pub extern "C" fn #copy(src: &#ty) -> ::std::boxed::Box<#ty> {
            ::std::boxed::Box::new(src.clone())
        }
    })
    .into()
}
