//! Dispatcher core trait.

use crate::{error::DispatchError, event::Event};
use serde_json::Value;

/// Something events can be published through.
///
/// Events hold a weak reference to the dispatcher they were published
/// through, so listeners can publish follow-up events without any global
/// state:
///
/// ```rust,ignore
/// fn on_create(event: &mut Event) -> Result<Option<Value>, BoxError> {
///     if let Some(dispatcher) = event.dispatcher() {
///         dispatcher.publish(Event::named("created"))?;
///     }
///     Ok(None)
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot dispatch events",
    label = "missing `Dispatcher` implementation",
    note = "Implement `Dispatcher` to publish events."
)]
pub trait Dispatcher: Send + Sync {
    /// Publish an owned event.
    ///
    /// Returns the most recent chained result. An event nobody listens to may
    /// be kept for later replay.
    fn publish(&self, event: Event) -> Result<Option<Value>, DispatchError>;

    /// Dispatch a borrowed event. The caller keeps the event; it is never held.
    fn dispatch(&self, event: &mut Event) -> Result<Option<Value>, DispatchError>;
}
