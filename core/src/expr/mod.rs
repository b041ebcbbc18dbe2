//! Engine-level predicates.
//!
//! Filters expressed against selectors compile into [`Predicate`] trees over
//! concrete [`Column`]s. Predicates render as SQL through `Display` and
//! combine with `&`, `|` and `!`.

mod logical;
mod predicate;

pub use logical::{and, not, or};
pub use predicate::*;

use crate::value::Value;
use compact_str::CompactString;
use std::fmt;

/// A column of a table, addressed by the alias the table is joined under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Column {
    table: CompactString,
    field: CompactString,
}

impl Column {
    pub fn new(table: impl Into<CompactString>, field: impl Into<CompactString>) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
        }
    }

    /// Alias of the table.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.field)
    }
}

/// Shorthand for [`Column::new`].
pub fn col(table: impl Into<CompactString>, field: impl Into<CompactString>) -> Column {
    Column::new(table, field)
}

/// Operand of a predicate.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Column(Column),
    Lower(Box<Expr>),
    Upper(Box<Expr>),
    Value(Value),
}

impl Expr {
    pub fn lower(self) -> Self {
        Expr::Lower(Box::new(self))
    }

    pub fn upper(self) -> Self {
        Expr::Upper(Box::new(self))
    }

    /// The column underneath any case transforms.
    pub fn column(&self) -> Option<&Column> {
        match self {
            Expr::Column(c) => Some(c),
            Expr::Lower(e) | Expr::Upper(e) => e.column(),
            Expr::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Expr::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(c) => write!(f, "{c}"),
            Expr::Lower(e) => write!(f, "LOWER({e})"),
            Expr::Upper(e) => write!(f, "UPPER({e})"),
            Expr::Value(v) => write!(f, "{v}"),
        }
    }
}

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Expr::Column(c)
    }
}

impl From<&Column> for Expr {
    fn from(c: &Column) -> Self {
        Expr::Column(c.clone())
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Value(v)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Value(s.into())
    }
}

impl From<i64> for Expr {
    fn from(i: i64) -> Self {
        Expr::Value(i.into())
    }
}

impl From<i32> for Expr {
    fn from(i: i32) -> Self {
        Expr::Value(i.into())
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Value(b.into())
    }
}

impl From<f64> for Expr {
    fn from(f: f64) -> Self {
        Expr::Value(f.into())
    }
}

/// Comparison operators of [`Predicate::Compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    /// The operator that holds exactly when this one does not.
    pub const fn inverse(&self) -> Self {
        match self {
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
        }
    }
}
