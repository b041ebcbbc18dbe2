//! Process-wide context filter.
//!
//! A context filter restricts every resource that opts into context
//! filtering, e.g. `(organisation)$name == "Red Cross"`. Resources take a
//! snapshot when they are created, so replacing the context never changes
//! a resource that already exists.

use crate::filter::Filter;
use std::sync::{Arc, PoisonError, RwLock};

static GLOBAL_CONTEXT: RwLock<Option<Arc<Filter>>> = RwLock::new(None);

/// Replaces the global context filter, returning the previous one.
pub fn set_global_context(filter: Option<Filter>) -> Option<Arc<Filter>> {
    replace(filter.map(Arc::new))
}

pub fn clear_global_context() -> Option<Arc<Filter>> {
    replace(None)
}

/// Current global context filter.
pub fn global_context() -> Option<Arc<Filter>> {
    GLOBAL_CONTEXT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn replace(filter: Option<Arc<Filter>>) -> Option<Arc<Filter>> {
    let mut slot = GLOBAL_CONTEXT
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *slot, filter)
}

/// Sets the global context for its lifetime and restores the previous one
/// when dropped.
#[must_use = "the context is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<Arc<Filter>>,
}

impl ContextGuard {
    pub fn set(filter: Filter) -> Self {
        Self {
            previous: set_global_context(Some(filter)),
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        replace(self.previous.take());
    }
}
