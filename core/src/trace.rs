//! Tracing utilities for resolution and filter observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level event for a resolved selector.
///
/// ```ignore
/// resq_trace_resolve!(selector, rfield.colname(), rfield.left().len());
/// ```
macro_rules! resq_trace_resolve {
    ($selector:expr, $colname:expr, $joins:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            selector = %$selector,
            colname = %$colname,
            joins = $joins,
            "resquery.resolve"
        );
    };
}

/// Emit a debug-level event when a resource filter has been compiled.
macro_rules! resq_trace_filter {
    ($table:expr, $left:expr, $distinct:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            table = %$table,
            left_joins = $left,
            distinct = $distinct,
            "resquery.filter"
        );
    };
}

/// Debug-level free-form event.
macro_rules! resq_debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)+);
    };
}

/// Warn-level free-form event, used where input is dropped instead of failing.
macro_rules! resq_warn {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)+);
    };
}
