//! Candidate resolution.
//!
//! For a published event, the resolver produces the ordered list of entries
//! that may run. Buckets are visited in this order:
//!
//! 1. `all`, the greedy wildcard,
//! 2. the event's explicit name,
//! 3. its concrete type,
//! 4. each ancestor type, in declaration order,
//! 5. each declared capability, in declaration order,
//! 6. `any`, which runs after everything else.
//!
//! A bucket reached twice through the same identity string is visited once.
//! Duplicate registrations inside a bucket are kept.

use crate::registry::{ListenerEntry, Registry};
use herald_core::{Event, kind};
use parking_lot::RwLock;
use std::sync::Arc;

/// The ordered, de-duplicated bucket identities visited for `event`.
pub fn lookup_order(event: &Event) -> Vec<&str> {
    let mut order: Vec<&str> = Vec::new();
    let candidates = std::iter::once(kind::ALL)
        .chain(event.identities())
        .chain(std::iter::once(kind::ANY));
    for identity in candidates {
        if !order.contains(&identity) {
            order.push(identity);
        }
    }
    order
}

/// A source of listener entries for an event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid ListenerProvider",
    label = "missing `ListenerProvider` implementation",
    note = "Implement `ListenerProvider::resolve_into` to supply listeners for events."
)]
pub trait ListenerProvider: Send + Sync {
    /// Append the entries that may handle `event`, in firing order.
    fn resolve_into(&self, event: &Event, out: &mut Vec<Arc<ListenerEntry>>);

    /// Collect the entries that may handle `event` into a snapshot.
    fn resolve(&self, event: &Event) -> Vec<Arc<ListenerEntry>> {
        let mut out = Vec::new();
        self.resolve_into(event, &mut out);
        out
    }
}

impl ListenerProvider for Registry {
    fn resolve_into(&self, event: &Event, out: &mut Vec<Arc<ListenerEntry>>) {
        for identity in lookup_order(event) {
            out.extend(self.bucket(identity).iter().cloned());
        }
    }
}

impl<P: ListenerProvider> ListenerProvider for RwLock<P> {
    fn resolve_into(&self, event: &Event, out: &mut Vec<Arc<ListenerEntry>>) {
        self.read().resolve_into(event, out);
    }
}

impl<P: ListenerProvider + ?Sized> ListenerProvider for Arc<P> {
    fn resolve_into(&self, event: &Event, out: &mut Vec<Arc<ListenerEntry>>) {
        (**self).resolve_into(event, out);
    }
}

/// Chains several providers; each one's entries follow the previous one's.
#[derive(Default, Clone)]
pub struct CompositeProvider {
    providers: Vec<Arc<dyn ListenerProvider>>,
}

impl CompositeProvider {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider.
    pub fn with(mut self, provider: Arc<dyn ListenerProvider>) -> Self {
        self.push(provider);
        self
    }

    /// Append a provider.
    pub fn push(&mut self, provider: Arc<dyn ListenerProvider>) {
        self.providers.push(provider);
    }

    /// Number of chained providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is chained.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ListenerProvider for CompositeProvider {
    fn resolve_into(&self, event: &Event, out: &mut Vec<Arc<ListenerEntry>>) {
        for provider in &self.providers {
            provider.resolve_into(event, out);
        }
    }
}
