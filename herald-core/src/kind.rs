//! Event identities.
//!
//! An event is reachable under several identities: its explicit name (if
//! any), its concrete type, each ancestor type and each capability it
//! declares. [`EventKind`] carries the type-side identities; they are
//! declared up front instead of being discovered at runtime.

use std::borrow::Cow;

/// Identity of a listener that runs for every event, before any other bucket.
pub const ALL: &str = "all";

/// Identity of a listener that runs for every event, after every other bucket.
pub const ANY: &str = "any";

/// Identity of timer-class events. Timer events are never held.
pub const TIMER: &str = "timer";

/// Identity used for derived error events unless configured otherwise.
pub const ERROR: &str = "error";

/// Type identity of events created with [`Event::named`](crate::Event::named).
pub const NAMED: &str = "event";

/// Reserved wildcard; it cannot be subscribed to.
pub const WILDCARD: &str = "*";

/// The type-side identity of an event.
///
/// # Example
///
/// ```rust
/// use herald_core::EventKind;
///
/// let kind = EventKind::new("user.created")
///     .with_ancestor("user.changed")
///     .with_capability("auditable");
///
/// assert!(kind.is_a("user.changed"));
/// assert_eq!(
///     kind.identities().collect::<Vec<_>>(),
///     ["user.created", "user.changed", "auditable"]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKind {
    type_name: Cow<'static, str>,
    ancestors: Vec<Cow<'static, str>>,
    capabilities: Vec<Cow<'static, str>>,
}

impl EventKind {
    /// Create a kind with the given concrete type identity.
    pub fn new(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: type_name.into(),
            ancestors: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// Append an ancestor type. Ancestors resolve in declaration order.
    pub fn with_ancestor(mut self, ancestor: impl Into<Cow<'static, str>>) -> Self {
        self.ancestors.push(ancestor.into());
        self
    }

    /// Append a capability. Capabilities resolve in declaration order.
    pub fn with_capability(mut self, capability: impl Into<Cow<'static, str>>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// The concrete type identity.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Ancestor types, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.ancestors.iter().map(|a| a.as_ref())
    }

    /// Declared capabilities.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.capabilities.iter().map(|c| c.as_ref())
    }

    /// Type, then ancestors, then capabilities.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.type_name())
            .chain(self.ancestors())
            .chain(self.capabilities())
    }

    /// Whether `identity` is this kind's type, an ancestor or a capability.
    pub fn is_a(&self, identity: &str) -> bool {
        self.identities().any(|id| id == identity)
    }
}

impl Default for EventKind {
    fn default() -> Self {
        Self::new(NAMED)
    }
}

/// A Rust type that declares an event identity.
///
/// Usually implemented with `#[derive(EventKind)]` from the `herald` crate.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not declare an event identity",
    label = "missing `Kind` implementation",
    note = "Derive `EventKind` or implement `Kind::kind` for `{Self}`."
)]
pub trait Kind {
    /// The identity shared by every event of this type.
    fn kind() -> EventKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities_follow_declaration_order() {
        let kind = EventKind::new("b")
            .with_capability("z")
            .with_ancestor("a1")
            .with_ancestor("a2");

        let ids: Vec<&str> = kind.identities().collect();
        assert_eq!(ids, ["b", "a1", "a2", "z"]);
    }

    #[test]
    fn test_default_kind_is_named() {
        assert_eq!(EventKind::default().type_name(), NAMED);
        assert!(!EventKind::default().is_a(TIMER));
    }
}
