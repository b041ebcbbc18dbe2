//! Reduction of a query to the values it permits for one field.
//!
//! Facets and pivot tables need to know which values of an axis field can
//! appear under a resource query. [`AxisFilter`] walks the compiled
//! predicate, looks only at terms on the axis column and reduces them to a
//! permitted or excluded set. Terms on other columns never constrain the
//! axis: under an OR they leave it unconstrained, under an AND they are
//! left to the query itself.

use crate::error::Result;
use crate::expr::{CmpOp, Column, Expr, Predicate};
use crate::field::ResourceField;
use crate::resource::Resource;
use crate::value::Value;
use compact_str::CompactString;
use std::collections::BTreeSet;

/// Values of one field as constrained by a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxisValues {
    /// No term of the query restricts the field
    Unconstrained,
    /// Only these values are permitted
    Only(BTreeSet<CompactString>),
    /// Any value except these
    Except(BTreeSet<CompactString>),
}

impl AxisValues {
    /// Permitted values, `None` unless the set is positive.
    pub fn permitted(&self) -> Option<&BTreeSet<CompactString>> {
        match self {
            AxisValues::Only(values) => Some(values),
            _ => None,
        }
    }

    /// Whether the axis may be computed without looking at the query.
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, AxisValues::Unconstrained)
    }

    /// Whether `value` may appear on the axis.
    pub fn admits(&self, value: &Value) -> bool {
        let key = value.set_key();
        match self {
            AxisValues::Unconstrained => true,
            AxisValues::Only(values) => values.contains(&key),
            AxisValues::Except(values) => !values.contains(&key),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AxisFilter {
    query: Predicate,
}

impl AxisFilter {
    pub fn new(query: Predicate) -> Self {
        Self { query }
    }

    /// Axis filter over the effective query of a resource.
    pub fn for_resource(resource: &Resource<'_>) -> Result<Self> {
        Ok(Self::new(resource.get_query()?))
    }

    pub fn query(&self) -> &Predicate {
        &self.query
    }

    /// Values of `rfield` permitted by the query.
    pub fn values(&self, rfield: &ResourceField) -> AxisValues {
        self.column_values(&rfield.column())
    }

    pub fn column_values(&self, column: &Column) -> AxisValues {
        match reduce(&self.query, column) {
            None => AxisValues::Unconstrained,
            Some(sets) => sets.finish(),
        }
    }
}

#[derive(Default)]
struct Sets {
    include: BTreeSet<CompactString>,
    exclude: BTreeSet<CompactString>,
}

impl Sets {
    fn include(values: impl IntoIterator<Item = CompactString>) -> Self {
        Self {
            include: values.into_iter().collect(),
            exclude: BTreeSet::new(),
        }
    }

    fn exclude(values: impl IntoIterator<Item = CompactString>) -> Self {
        Self {
            include: BTreeSet::new(),
            exclude: values.into_iter().collect(),
        }
    }

    fn and(mut self, other: Sets) -> Sets {
        self.include.extend(other.include);
        self.exclude.extend(other.exclude);
        self
    }

    fn or(mut self, other: Sets) -> Sets {
        let exclude = match (self.exclude.is_empty(), other.exclude.is_empty()) {
            (false, false) => self.exclude.intersection(&other.exclude).cloned().collect(),
            (false, true) => std::mem::take(&mut self.exclude),
            _ => other.exclude,
        };
        self.include.extend(other.include);
        let exclude = exclude
            .into_iter()
            .filter(|v| !self.include.contains(v))
            .collect();
        Sets {
            include: self.include,
            exclude,
        }
    }

    fn invert(self) -> Sets {
        Sets {
            include: self.exclude,
            exclude: self.include,
        }
    }

    fn finish(self) -> AxisValues {
        if !self.include.is_empty() {
            let permitted = self
                .include
                .into_iter()
                .filter(|v| !self.exclude.contains(v))
                .collect();
            AxisValues::Only(permitted)
        } else if !self.exclude.is_empty() {
            AxisValues::Except(self.exclude)
        } else {
            AxisValues::Unconstrained
        }
    }
}

/// `None` where the subtree does not constrain `column`.
fn reduce(query: &Predicate, column: &Column) -> Option<Sets> {
    match query {
        Predicate::And(l, r) => match (reduce(l, column), reduce(r, column)) {
            (Some(l), Some(r)) => Some(l.and(r)),
            (l, r) => l.or(r),
        },
        Predicate::Or(l, r) => Some(reduce(l, column)?.or(reduce(r, column)?)),
        Predicate::Not(inner) => reduce(inner, column).map(Sets::invert),
        Predicate::Compare { lhs, op, rhs } => {
            let value = operand_value(lhs, rhs, column)?;
            match op {
                CmpOp::Eq => Some(Sets::include([value.set_key()])),
                CmpOp::Ne => Some(Sets::exclude([value.set_key()])),
                _ => None,
            }
        }
        Predicate::Belongs { expr, values } if on_column(expr, column) => {
            Some(Sets::include(values.iter().map(Value::set_key)))
        }
        Predicate::Contains { column: c, value } if c == column => {
            Some(Sets::include([value.set_key()]))
        }
        _ => None,
    }
}

/// The literal compared with `column`, in either operand position.
fn operand_value<'p>(lhs: &'p Expr, rhs: &'p Expr, column: &Column) -> Option<&'p Value> {
    if on_column(lhs, column) {
        rhs.as_value()
    } else if on_column(rhs, column) {
        lhs.as_value()
    } else {
        None
    }
}

fn on_column(expr: &Expr, column: &Column) -> bool {
    matches!(expr, Expr::Column(c) if c == column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    fn set(values: &[&str]) -> BTreeSet<CompactString> {
        values.iter().map(|v| CompactString::from(*v)).collect()
    }

    fn skills() -> Column {
        col("req_req_skill", "skill_id")
    }

    fn contains_all(values: &[i64]) -> Predicate {
        values
            .iter()
            .map(|v| Predicate::contains(skills(), *v))
            .reduce(|acc, p| acc & p)
            .unwrap()
    }

    fn values(query: Predicate) -> AxisValues {
        AxisFilter::new(query).column_values(&skills())
    }

    #[test]
    fn test_negated_equality_excludes() {
        let query = contains_all(&[1, 2, 3]) & !Predicate::eq(skills(), 2);
        assert_eq!(values(query), AxisValues::Only(set(&["1", "3"])));
    }

    #[test]
    fn test_negated_inequality_includes() {
        let query = contains_all(&[1, 2, 3]) & !Predicate::ne(skills(), 2);
        assert_eq!(values(query), AxisValues::Only(set(&["1", "2", "3"])));
    }

    #[test]
    fn test_alternatives() {
        let query = contains_all(&[1, 2, 3]) | !Predicate::eq(skills(), 2);
        assert_eq!(values(query), AxisValues::Only(set(&["1", "2", "3"])));

        let query = contains_all(&[1, 2, 3]) | !Predicate::ne(skills(), 2);
        assert_eq!(values(query), AxisValues::Only(set(&["1", "2", "3"])));

        let query = Predicate::ne(skills(), 2) | Predicate::ne(skills(), 3);
        assert_eq!(values(query), AxisValues::Unconstrained);
    }

    #[test]
    fn test_other_columns() {
        let other = Predicate::eq(col("req_req", "priority"), 3);
        assert_eq!(values(other.clone()), AxisValues::Unconstrained);

        let query = Predicate::belongs(skills(), [4, 5]) & other.clone();
        assert_eq!(values(query), AxisValues::Only(set(&["4", "5"])));

        let query = Predicate::belongs(skills(), [4, 5]) | other;
        assert_eq!(values(query), AxisValues::Unconstrained);

        let query = !Predicate::belongs(skills(), [4, 5])
            & Predicate::gt(skills(), 1)
            & Predicate::like(skills(), "%3%");
        let result = values(query);
        assert_eq!(result, AxisValues::Except(set(&["4", "5"])));
        assert!(result.admits(&Value::Int(3)));
        assert!(!result.admits(&Value::Int(4)));
    }
}
