//! `#[derive(EventKind)]` implementation.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    DeriveInput, LitStr, Token, parenthesized, parse_macro_input, punctuated::Punctuated,
};

/// Identity declared through `#[event(...)]` attributes.
#[derive(Default)]
struct EventArgs {
    type_name: Option<LitStr>,
    extends: Vec<LitStr>,
    implements: Vec<LitStr>,
}

impl EventArgs {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut args = EventArgs::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("event")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("type_name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "event type_name cannot be empty"));
                    }
                    args.type_name = Some(lit);
                    Ok(())
                } else if meta.path.is_ident("extends") {
                    args.extends.extend(parse_list(&meta)?);
                    Ok(())
                } else if meta.path.is_ident("implements") {
                    args.implements.extend(parse_list(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unknown event attribute, expected `type_name`, `extends` or `implements`"))
                }
            })?;
        }

        Ok(args)
    }
}

fn parse_list(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Vec<LitStr>> {
    let content;
    parenthesized!(content in meta.input);
    let list = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    for lit in &list {
        if lit.value().is_empty() {
            return Err(syn::Error::new(lit.span(), "event identities cannot be empty"));
        }
    }
    Ok(list.into_iter().collect())
}

/// Implementation of `#[derive(EventKind)]`.
pub fn derive_event_kind_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let args = match EventArgs::from_attrs(&input.attrs) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let type_name = args
        .type_name
        .unwrap_or_else(|| LitStr::new(&name.to_string(), Span::call_site()));
    let extends = &args.extends;
    let implements = &args.implements;

    let expanded = quote! {
        impl #impl_generics ::herald::Kind for #name #ty_generics #where_clause {
            fn kind() -> ::herald::EventKind {
                ::herald::EventKind::new(#type_name)
                    #( .with_ancestor(#extends) )*
                    #( .with_capability(#implements) )*
            }
        }
    };

    TokenStream::from(expanded)
}
