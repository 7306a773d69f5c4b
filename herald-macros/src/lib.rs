//! Procedural macros for Herald.
//!
//! - `#[derive(EventKind)]` - Declares the event identity of a Rust type

use proc_macro::TokenStream;

mod event;

/// Derive macro implementing `herald::Kind`.
///
/// The type identity defaults to the type's name. Ancestors and capabilities
/// are declared in resolution order:
///
/// ```rust,ignore
/// #[derive(EventKind)]
/// #[event(type_name = "user.created", extends("user.changed"), implements("auditable"))]
/// struct UserCreated;
/// ```
#[proc_macro_derive(EventKind, attributes(event))]
pub fn derive_event_kind(input: TokenStream) -> TokenStream {
    event::derive_event_kind_impl(input)
}
