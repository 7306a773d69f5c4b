//! Priority tiers.

use crate::error::InvalidSubscription;
use serde::{Deserialize, Serialize};

/// One of six ordered bands controlling firing order for a single identity.
///
/// `Urgent` fires first, `Lowest` last. Listeners in the same tier fire in
/// registration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Fires before every other tier.
    Urgent = 0,
    /// Second tier.
    Highest = 1,
    /// Third tier.
    High = 2,
    /// The default tier.
    #[default]
    Normal = 3,
    /// Fifth tier.
    Low = 4,
    /// Fires after every other tier.
    Lowest = 5,
}

impl Priority {
    /// All tiers, highest first.
    pub const ALL: [Priority; 6] = [
        Priority::Urgent,
        Priority::Highest,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::Lowest,
    ];

    /// The raw tier number (`0` = urgent).
    pub const fn tier(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidSubscription;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        Priority::ALL
            .get(usize::from(tier))
            .copied()
            .ok_or(InvalidSubscription::PriorityOutOfRange(tier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_are_ordered() {
        assert!(Priority::Urgent < Priority::Highest);
        assert!(Priority::Low < Priority::Lowest);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_try_from_tier() {
        assert_eq!(Priority::try_from(2), Ok(Priority::High));
        assert_eq!(
            Priority::try_from(6),
            Err(InvalidSubscription::PriorityOutOfRange(6))
        );
        for p in Priority::ALL {
            assert_eq!(Priority::try_from(p.tier()), Ok(p));
        }
    }
}
