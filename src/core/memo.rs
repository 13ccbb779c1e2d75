use std::sync::OnceLock;

use crate::core::error::{Error, Result};

/// A single-assignment cache slot holding either a value or the error that
/// was produced while computing it.
///
/// The slot starts unresolved and becomes resolved exactly once, on the first
/// call to [`Memo::get_or_resolve`]. Concurrent first callers block on the
/// same initialization, so the resolver closure runs at most once per slot.
#[derive(Debug)]
pub struct Memo<T> {
    slot: OnceLock<Result<T>>,
}

impl<T> Memo<T> {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// Returns the cached outcome, running `resolve` if the slot is empty.
    ///
    /// Errors are cached too: a failed resolution is returned as-is on every
    /// later call and `resolve` is never retried.
    pub fn get_or_resolve<F>(&self, resolve: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.slot.get_or_init(resolve).as_ref().map_err(Error::clone)
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}
