//! Filter expressions over field selectors.
//!
//! A [`Filter`] is written against selectors rather than columns:
//!
//! ```ignore
//! let filter = field("organisation_id$name").lower().like("%red cross%")
//!     & !field("office_type_id").eq(5);
//! ```
//!
//! It only becomes a [`Predicate`](crate::expr::Predicate) when compiled
//! against a [`Scope`](crate::field::Scope), which is also when selectors are
//! resolved and their joins collected.

mod compile;
mod evaluate;

pub use compile::Joins;

use crate::error::{QueryError, Result};
use crate::expr::Expr;
use crate::field::{ResourceField, Scope};
use crate::value::Value;
use compact_str::CompactString;
use core::ops::{BitAnd, BitOr, Not};
use smallvec::SmallVec;
use std::fmt;

// =============================================================================
// Field selectors
// =============================================================================

/// Case transform applied to a selector before comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    Lower,
    Upper,
}

/// A field selector string with optional case transforms.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSelector {
    name: CompactString,
    transforms: SmallVec<[Transform; 2]>,
}

/// Shorthand for [`FieldSelector::new`].
pub fn field(name: impl Into<CompactString>) -> FieldSelector {
    FieldSelector::new(name)
}

impl FieldSelector {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            transforms: SmallVec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn lower(mut self) -> Self {
        self.transforms.push(Transform::Lower);
        self
    }

    pub fn upper(mut self) -> Self {
        self.transforms.push(Transform::Upper);
        self
    }

    /// Same selector under another name, transforms kept.
    pub(crate) fn renamed(&self, name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            transforms: self.transforms.clone(),
        }
    }

    pub fn resolve(&self, scope: &Scope<'_>) -> Result<ResourceField> {
        scope.resolve(&self.name)
    }

    /// Wraps `expr` in the case transforms. Transforms only apply to text.
    pub(crate) fn apply(&self, expr: Expr, text: bool) -> Expr {
        if !text {
            return expr;
        }
        self.transforms.iter().fold(expr, |e, t| match t {
            Transform::Lower => e.lower(),
            Transform::Upper => e.upper(),
        })
    }

    /// Applies the case transforms to a comparison value.
    pub(crate) fn fold(&self, value: Value) -> Value {
        self.transforms.iter().fold(value, |v, t| match t {
            Transform::Lower => v.to_lower(),
            Transform::Upper => v.to_upper(),
        })
    }

    pub(crate) fn compare(self, op: Operator, operand: impl Into<Operand>) -> Filter {
        Filter::Comparison(Comparison {
            selector: self,
            op,
            operand: operand.into(),
        })
    }

    pub fn eq(self, operand: impl Into<Operand>) -> Filter {
        self.compare(Operator::Eq, operand)
    }

    pub fn ne(self, operand: impl Into<Operand>) -> Filter {
        self.compare(Operator::Ne, operand)
    }

    pub fn lt(self, operand: impl Into<Operand>) -> Filter {
        self.compare(Operator::Lt, operand)
    }

    pub fn le(self, operand: impl Into<Operand>) -> Filter {
        self.compare(Operator::Le, operand)
    }

    pub fn gt(self, operand: impl Into<Operand>) -> Filter {
        self.compare(Operator::Gt, operand)
    }

    pub fn ge(self, operand: impl Into<Operand>) -> Filter {
        self.compare(Operator::Ge, operand)
    }

    /// SQL-style pattern match, `%` and `_` as wildcards. A list of patterns
    /// matches if any pattern does.
    pub fn like(self, pattern: impl Into<Operand>) -> Filter {
        self.compare(Operator::Like, pattern)
    }

    pub fn belongs(self, values: impl Into<Operand>) -> Filter {
        self.compare(Operator::Belongs, values)
    }

    /// List fields: every value is in the list. Text fields: substring match
    /// of every value.
    pub fn contains(self, values: impl Into<Operand>) -> Filter {
        self.compare(Operator::Contains, values)
    }

    /// List fields: at least one value is in the list. Scalar fields: same
    /// as `belongs`.
    pub fn anyof(self, values: impl Into<Operand>) -> Filter {
        self.compare(Operator::AnyOf, values)
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in self.transforms.iter().rev() {
            f.write_str(match t {
                Transform::Lower => "lower(",
                Transform::Upper => "upper(",
            })?;
        }
        f.write_str(&self.name)?;
        for _ in &self.transforms {
            f.write_str(")")?;
        }
        Ok(())
    }
}

// =============================================================================
// Operators and operands
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    Belongs,
    Contains,
    AnyOf,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::Like,
        Operator::Belongs,
        Operator::Contains,
        Operator::AnyOf,
    ];

    /// Name used in URL queries (`field__like=...`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Like => "like",
            Operator::Belongs => "belongs",
            Operator::Contains => "contains",
            Operator::AnyOf => "anyof",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| QueryError::UnknownOperator(name.into()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a comparison: literal value(s) or another field.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Value(Value),
    Field(FieldSelector),
}

impl Operand {
    /// Literal values, a list operand yields its items.
    pub fn values(&self) -> &[Value] {
        match self {
            Operand::Value(Value::List(items)) => items,
            Operand::Value(v) => std::slice::from_ref(v),
            Operand::Field(_) => &[],
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Operand::Value(Value::List(_)))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(v) => write!(f, "{v}"),
            Operand::Field(s) => write!(f, "{s}"),
        }
    }
}

impl From<FieldSelector> for Operand {
    fn from(s: FieldSelector) -> Self {
        Operand::Field(s)
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Value(s.into())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Value(s.into())
    }
}

impl From<i64> for Operand {
    fn from(i: i64) -> Self {
        Operand::Value(i.into())
    }
}

impl From<i32> for Operand {
    fn from(i: i32) -> Self {
        Operand::Value(i.into())
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Value(b.into())
    }
}

impl From<f64> for Operand {
    fn from(f: f64) -> Self {
        Operand::Value(f.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::Value(Value::from(items))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(items: [T; N]) -> Self {
        Operand::Value(Value::List(items.into_iter().map(Into::into).collect()))
    }
}

// =============================================================================
// Filter trees
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub selector: FieldSelector,
    pub op: Operator,
    pub operand: Operand,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.selector, self.op, self.operand)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Comparison(Comparison),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// Left-folded conjunction, `None` for no filters.
    pub fn all<I: IntoIterator<Item = Filter>>(filters: I) -> Option<Filter> {
        filters.into_iter().reduce(|acc, f| acc & f)
    }

    /// Left-folded disjunction, `None` for no filters.
    pub fn any<I: IntoIterator<Item = Filter>>(filters: I) -> Option<Filter> {
        filters.into_iter().reduce(|acc, f| acc | f)
    }

    /// Every selector used by the filter, operand fields included, in order
    /// of appearance.
    pub fn selectors(&self) -> Vec<&FieldSelector> {
        let mut out = Vec::new();
        self.collect_selectors(&mut out);
        out
    }

    fn collect_selectors<'a>(&'a self, out: &mut Vec<&'a FieldSelector>) {
        match self {
            Filter::Comparison(c) => {
                out.push(&c.selector);
                if let Operand::Field(other) = &c.operand {
                    out.push(other);
                }
            }
            Filter::And(l, r) | Filter::Or(l, r) => {
                l.collect_selectors(out);
                r.collect_selectors(out);
            }
            Filter::Not(f) => f.collect_selectors(out),
        }
    }

    /// Top-level conjuncts: `(a & b) & c` yields `[a, b, c]`.
    pub fn conjuncts(&self) -> Vec<&Filter> {
        match self {
            Filter::And(l, r) => {
                let mut out = l.conjuncts();
                out.extend(r.conjuncts());
                out
            }
            other => vec![other],
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Comparison(c) => write!(f, "({c})"),
            Filter::And(l, r) => write!(f, "({l} AND {r})"),
            Filter::Or(l, r) => write!(f, "({l} OR {r})"),
            Filter::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        Filter::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        Filter::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_names() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_name(op.as_str()).unwrap(), op);
        }
        assert_eq!(
            Operator::from_name("!like"),
            Err(QueryError::UnknownOperator("!like".into()))
        );
    }

    #[test]
    fn test_selectors_in_order() {
        let filter = (field("name").eq("x") | field("organisation_id$name").eq(field("name")))
            & !field("office_type_id").belongs([1, 2]);
        let names: Vec<&str> = filter.selectors().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["name", "organisation_id$name", "name", "office_type_id"]
        );
        assert_eq!(filter.conjuncts().len(), 2);
    }

    #[test]
    fn test_display() {
        let filter = field("name").lower().like("%x%") & !field("id").eq(1);
        assert_eq!(
            filter.to_string(),
            "((lower(name) like '%x%') AND (NOT (id eq 1)))"
        );
    }

    #[test]
    fn test_operand_values() {
        assert_eq!(Operand::from([1, 2]).values(), &[Value::Int(1), Value::Int(2)]);
        assert_eq!(Operand::from("x").values(), &[Value::from("x")]);
        assert!(Operand::from(field("name")).values().is_empty());
    }
}
