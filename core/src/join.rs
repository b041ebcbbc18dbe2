//! Join types and join plans.
//!
//! A join plan maps the alias of a target table to the fragments needed to
//! reach it. Inner plans hold bare predicates, left plans hold
//! [`LeftJoin`] entries. Both are insertion-ordered multimaps, so merging
//! the plans of several filters appends instead of overwriting.

use crate::expr::Predicate;
use crate::multimap::OrderedMultiMap;
use crate::schema::TableRef;
use std::fmt;

// =============================================================================
// Join Type Enum
// =============================================================================

/// The type of JOIN operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
}

impl JoinType {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

// =============================================================================
// Join entries
// =============================================================================

/// A table joined with an `ON` condition.
#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: TableRef,
    pub on: Predicate,
}

impl Join {
    pub fn inner(table: TableRef, on: Predicate) -> Self {
        Self {
            join_type: JoinType::Inner,
            table,
            on,
        }
    }

    pub fn left(table: TableRef, on: Predicate) -> Self {
        Self {
            join_type: JoinType::Left,
            table,
            on,
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ON {}", self.join_type.as_sql(), self.table, self.on)
    }
}

/// `table.on(condition)` in a left join plan.
#[derive(Clone, Debug, PartialEq)]
pub struct LeftJoin {
    pub table: TableRef,
    pub on: Predicate,
}

impl LeftJoin {
    pub fn new(table: TableRef, on: Predicate) -> Self {
        Self { table, on }
    }

    pub fn into_join(self) -> Join {
        Join::left(self.table, self.on)
    }
}

impl fmt::Display for LeftJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ON {}", self.table, self.on)
    }
}

// =============================================================================
// Join plans
// =============================================================================

/// Ordered multimap from target table alias to join fragments.
pub type JoinMap<T> = OrderedMultiMap<T>;

/// Inner join conditions, to be conjoined into the WHERE clause.
pub type InnerJoins = JoinMap<Predicate>;

/// Left join chains per target table.
pub type LeftJoins = JoinMap<LeftJoin>;

impl InnerJoins {
    /// Conjunction of all join conditions in plan order.
    pub fn condition(&self) -> Option<Predicate> {
        crate::expr::and(self.values().cloned())
    }
}

impl LeftJoins {
    /// Flattened join list, exact duplicates dropped.
    pub fn as_list(&self) -> Vec<LeftJoin> {
        self.to_unique_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    fn office_join() -> LeftJoin {
        let office = TableRef::new("org_office");
        LeftJoin::new(
            office.clone(),
            Predicate::eq(office.column("organisation_id"), col("org_organisation", "id")),
        )
    }

    #[test]
    fn test_as_list_drops_exact_duplicates() {
        let mut joins = LeftJoins::new();
        joins.append("org_office", office_join());
        joins.append("org_office", office_join());
        assert_eq!(joins.value_count(), 2);
        assert_eq!(joins.as_list(), vec![office_join()]);
    }

    #[test]
    fn test_render_join() {
        let join = office_join().into_join();
        assert_eq!(
            join.to_string(),
            "LEFT JOIN org_office ON (org_office.organisation_id = org_organisation.id)"
        );
    }

    #[test]
    fn test_inner_condition_is_left_nested() {
        let mut joins = InnerJoins::new();
        let a = Predicate::eq(col("a", "x"), col("b", "id"));
        let b = Predicate::eq(col("b", "y"), col("c", "id"));
        joins.append("b", a.clone());
        joins.append("c", b.clone());
        assert_eq!(joins.condition(), Some(a & b));
        assert_eq!(InnerJoins::new().condition(), None);
    }
}
