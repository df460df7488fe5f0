//! Non-reentrant section guard.
//!
//! Some operations emit notifications whose listeners may synchronously call
//! back into the operation that is still running (a tree re-sort whose
//! `node_changed` listener asks for another re-sort, for example). A
//! [`ReentrancyGuard`] turns such nested calls into cheap no-ops.
//!
//! ```
//! use table_sort_core::ReentrancyGuard;
//!
//! let guard = ReentrancyGuard::new();
//! let outer = guard.try_enter().expect("not yet held");
//! assert!(guard.try_enter().is_none());
//! drop(outer);
//! assert!(guard.try_enter().is_some());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag that can be held by at most one caller at a time.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    active: AtomicBool,
}

impl ReentrancyGuard {
    /// Creates a guard that is not held.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
        }
    }

    /// Attempts to enter the guarded section.
    ///
    /// Returns `None` when the section is already entered. The returned token
    /// releases the guard when dropped.
    pub fn try_enter(&self) -> Option<ReentrancyToken<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReentrancyToken { guard: self })
    }

    /// Returns `true` while some caller holds the guard.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// RAII token proving the holder is inside a [`ReentrancyGuard`].
#[derive(Debug)]
pub struct ReentrancyToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for ReentrancyToken<'_> {
    fn drop(&mut self) {
        self.guard.active.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_blocks_nested_entry() {
        let guard = ReentrancyGuard::new();
        assert!(!guard.is_active());

        let token = guard.try_enter();
        assert!(token.is_some());
        assert!(guard.is_active());
        assert!(guard.try_enter().is_none());

        drop(token);
        assert!(!guard.is_active());
        assert!(guard.try_enter().is_some());
    }
}
