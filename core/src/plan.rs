//! Executable query plan of a resource.

use crate::expr::Predicate;
use crate::join::Join;
use crate::schema::TableRef;
use compact_str::CompactString;
use std::fmt;

/// What the execution engine runs: columns, base table, joins in order and
/// the WHERE condition. Renders as SQL through `Display`.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    pub distinct: bool,
    pub columns: Vec<CompactString>,
    pub table: TableRef,
    /// Tables referenced by the condition but not joined, listed in FROM
    pub implicit: Vec<TableRef>,
    pub joins: Vec<Join>,
    pub condition: Predicate,
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        if self.columns.is_empty() {
            write!(f, "{}.id", self.table.alias())?;
        } else {
            f.write_str(&self.columns.join(", "))?;
        }
        write!(f, " FROM {}", self.table)?;
        for table in &self.implicit {
            write!(f, ", {table}")?;
        }
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        write!(f, " WHERE {};", self.condition)
    }
}
