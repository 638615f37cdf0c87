//! Run epochs
//!
//! Every start or reset of a sequence moves to a fresh epoch. Work that was
//! scheduled under an older epoch compares its captured value against the
//! current one before touching shared state, so late callbacks from an
//! abandoned run are dropped instead of applied.

use std::fmt;

/// Monotonic tag identifying one run of a sequence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(u64);

impl Epoch {
    /// The epoch a freshly constructed controller starts in
    pub const INITIAL: Epoch = Epoch(0);

    /// The epoch that follows this one
    pub fn next(self) -> Epoch {
        Epoch(self.0.wrapping_add(1))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_strictly_greater() {
        let a = Epoch::INITIAL;
        let b = a.next();
        assert!(b > a);
        assert_eq!(b.as_u64(), 1);
        assert_eq!(b.to_string(), "#1");
    }
}
