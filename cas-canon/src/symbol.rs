//! Symbolic variables.
//!
//! A [`Symbol`]'s identity is its serial number, assigned from a process-wide
//! counter at construction. Two symbols created with the same name are still
//! distinct; the name only matters for display. This makes comparison and
//! hashing trivially cheap, and gives the canonical ordering a stable key
//! that does not depend on name collation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// The next serial number to hand out. Starts at 0; incremented atomically so
/// symbol creation is safe from multiple threads.
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(0);

/// A symbolic variable, such as `x` or `y`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol {
    serial: u64,
    name: Rc<str>,
}

impl Symbol {
    /// Creates a new symbol with the given display name and a fresh serial
    /// number.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            serial: NEXT_SERIAL.fetch_add(1, AtomicOrdering::Relaxed),
            name: name.into().into(),
        }
    }

    /// The symbol's unique serial number.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The symbol's display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.serial == other.serial
    }
}

impl Eq for Symbol {}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serial.cmp(&other.serial)
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serial.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_are_unique() {
        let a = Symbol::new("x");
        let b = Symbol::new("x");
        assert_ne!(a, b);
        assert!(a.serial() < b.serial());
    }

    #[test]
    fn identity_is_by_serial_not_name() {
        let a = Symbol::new("x");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.name(), "x");
    }
}
