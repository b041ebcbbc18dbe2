use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The selector is syntactically invalid, names a component or field that
    /// does not exist, or uses `.` where `$` is required
    #[error("Unresolvable selector `{selector}`: {reason}")]
    UnresolvableSelector {
        selector: CompactString,
        reason: CompactString,
    },

    /// Two components on the same master claim the same alias
    #[error("Ambiguous alias `{alias}` for components of {table}")]
    AmbiguousAlias {
        table: CompactString,
        alias: CompactString,
    },

    /// A URL query value could not be tokenized
    #[error("Malformed URL query value `{value}`: {reason}")]
    MalformedUrlQueryValue { value: String, reason: &'static str },

    /// No such table in the schema
    #[error("Unknown table: {0}")]
    UnknownTable(CompactString),

    /// No such component registered on the table
    #[error("No component `{alias}` registered on {table}")]
    UnknownComponent {
        table: CompactString,
        alias: CompactString,
    },

    /// Operator name not recognized
    #[error("Unknown operator: {0}")]
    UnknownOperator(CompactString),

    /// Operator not applicable to the field or operand
    #[error("Operator `{op}` cannot be applied to `{selector}`")]
    InvalidOperator {
        op: &'static str,
        selector: CompactString,
    },

    /// Virtual fields have no column and cannot be part of a compiled query
    #[error("Virtual field `{0}` cannot be compiled into a query")]
    VirtualField(CompactString),

    /// Like-pattern could not be turned into a matcher
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Inconsistent schema description
    #[error("Schema error: {0}")]
    Schema(String),
}

impl QueryError {
    pub(crate) fn unresolvable(
        selector: impl Into<CompactString>,
        reason: impl Into<CompactString>,
    ) -> Self {
        Self::UnresolvableSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for selector resolution and query compilation
pub type Result<T> = std::result::Result<T, QueryError>;
