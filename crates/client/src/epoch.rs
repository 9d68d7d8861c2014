//! Generation counter used to discard responses that outlive their view.
//!
//! A request captures [`Epoch::current`] when it is issued and checks
//! [`Epoch::is_current`] before applying its result. Navigating away
//! calls [`Epoch::advance`], which makes every outstanding token stale.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token captured at request time.
pub type EpochToken = u64;

#[derive(Debug, Default)]
pub struct Epoch(AtomicU64);

impl Epoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> EpochToken {
        self.0.load(Ordering::Acquire)
    }

    /// Invalidate all outstanding tokens and return the new one.
    pub fn advance(&self) -> EpochToken {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, token: EpochToken) -> bool {
        self.current() == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_invalidates_old_tokens() {
        let epoch = Epoch::new();
        let token = epoch.current();
        assert!(epoch.is_current(token));

        let next = epoch.advance();
        assert!(!epoch.is_current(token));
        assert!(epoch.is_current(next));
        assert_eq!(next, token + 1);
    }
}
