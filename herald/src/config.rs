//! Orchestrator configuration.

use herald_core::kind;
use serde::{Deserialize, Serialize};

/// Behaviour switches of an [`Orchestrator`](crate::Orchestrator).
///
/// Every field has a default, so partial documents deserialize:
///
/// ```rust
/// use herald::DispatchConfig;
///
/// let config: DispatchConfig = serde_json::from_str(r#"{ "hold_unheard": true }"#).unwrap();
/// assert!(config.hold_unheard);
/// assert_eq!(config.error_event, "error");
/// assert!(config.recover_errors);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Keep events nobody listens to and replay them on a matching subscribe.
    pub hold_unheard: bool,
    /// Type identity of the event published when a listener fails.
    pub error_event: String,
    /// Publish an error event when a listener fails.
    pub recover_errors: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            hold_unheard: false,
            error_event: kind::ERROR.to_owned(),
            recover_errors: true,
        }
    }
}
