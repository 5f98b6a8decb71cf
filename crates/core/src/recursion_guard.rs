// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Reentrancy defence for the type-inference engine's method-return and
//! self-attribute inferencers. The reference implementation models this
//! with a context-local set plus a decorator that adds the key on entry
//! and discards it in a `finally`; in Rust the natural equivalent is an
//! RAII guard whose `Drop` always releases, which holds even if the
//! inference call unwinds.

use crate::FastSet;
use std::cell::RefCell;
use std::rc::Rc;

/// Tracks in-flight inference keys for one logical inference run. Cheaply
/// cloneable (an `Rc<RefCell<_>>`) so it can be shared between the engine
/// and the scoped guards it hands out.
#[derive(Debug, Clone, Default)]
pub struct RecursionGuard {
    in_flight: Rc<RefCell<FastSet<String>>>,
}

impl RecursionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to enter `key`. Returns `None` if `key` is already
    /// in-flight (a cycle); otherwise returns a scope that removes `key`
    /// when dropped.
    pub fn enter(&self, key: impl Into<String>) -> Option<GuardScope<'_>> {
        let key = key.into();
        let mut set = self.in_flight.borrow_mut();
        if !set.insert(key.clone()) {
            return None;
        }
        drop(set);
        Some(GuardScope {
            guard: self,
            key: Some(key),
        })
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.in_flight.borrow().contains(key)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.in_flight.borrow().len()
    }
}

/// RAII scope returned by [`RecursionGuard::enter`]; releases its key on
/// drop regardless of how the scope ends (normal return or unwind).
pub struct GuardScope<'a> {
    guard: &'a RecursionGuard,
    key: Option<String>,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.guard.in_flight.borrow_mut().remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reentry_on_same_key() {
        let guard = RecursionGuard::new();
        let _outer = guard.enter("a.b.method").unwrap();
        assert!(guard.enter("a.b.method").is_none());
        assert!(guard.enter("a.b.other").is_some_and(|s| {
            drop(s);
            true
        }));
    }

    #[test]
    fn releases_on_drop_always() {
        let guard = RecursionGuard::new();
        {
            let _scope = guard.enter("x").unwrap();
            assert!(guard.contains("x"));
        }
        assert!(!guard.contains("x"));
        assert_eq!(guard.len(), 0);
    }

    #[test]
    fn releases_on_unwind() {
        let guard = RecursionGuard::new();
        let guard2 = guard.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _scope = guard2.enter("y").unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!guard.contains("y"));
    }
}
