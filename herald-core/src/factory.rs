//! Event construction seam.

use crate::{error::FactoryError, event::Event};

/// Builds events from a type identifier.
///
/// Application code depends on this trait instead of constructing events
/// directly; the dispatcher never calls it.
pub trait EventFactory: Send + Sync {
    /// Create a fresh event of the given type.
    fn create(&self, type_id: &str) -> Result<Event, FactoryError>;
}
