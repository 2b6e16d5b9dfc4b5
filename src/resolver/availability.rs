//! Memoized reachability of the local source

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Reachability of the local source as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AvailabilityState {
    /// Not probed since creation or the last reset
    Unknown = 0,
    /// Last probe answered 200
    Available = 1,
    /// Last probe or fetch failed
    Unavailable = 2,
}

impl AvailabilityState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Available,
            2 => Self::Unavailable,
            _ => Self::Unknown,
        }
    }

    /// `None` while unknown
    #[must_use]
    pub const fn as_bool(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::Available => Some(true),
            Self::Unavailable => Some(false),
        }
    }
}

/// Shared availability memo
///
/// Transitions: `Unknown -> Available | Unavailable` on probe,
/// `Available -> Unavailable` on a failed fetch, anything `-> Unknown` on reset.
/// Concurrent readers may observe a stale value; the worst outcome is one
/// extra probe.
#[derive(Debug)]
pub struct Availability {
    state: AtomicU8,
}

impl Availability {
    /// Start unknown
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(AvailabilityState::Unknown as u8),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> AvailabilityState {
        AvailabilityState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Memoized value, `None` when a probe is needed
    #[must_use]
    pub fn get(&self) -> Option<bool> {
        self.state().as_bool()
    }

    /// Record a probe or fetch outcome
    pub fn set(&self, available: bool) {
        let state = if available {
            AvailabilityState::Available
        } else {
            AvailabilityState::Unavailable
        };
        self.state.store(state as u8, Ordering::Release);
    }

    /// Forget the memoized value
    pub fn reset(&self) {
        self.state
            .store(AvailabilityState::Unknown as u8, Ordering::Release);
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_transitions() {
        let availability = Availability::new();
        assert_eq!(availability.state(), AvailabilityState::Unknown);
        assert_eq!(availability.get(), None);

        availability.set(true);
        assert_eq!(availability.get(), Some(true));

        availability.set(false);
        assert_eq!(availability.state(), AvailabilityState::Unavailable);

        availability.reset();
        assert_eq!(availability.get(), None);
    }
}
