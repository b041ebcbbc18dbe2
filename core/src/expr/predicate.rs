use super::{CmpOp, Column, Expr};
use crate::schema::TableRef;
use crate::value::Value;
use compact_str::CompactString;
use std::fmt;

/// A boolean condition over columns, as handed to the storage engine.
///
/// Structural equality is exact: `(a & b) & c` and `a & (b & c)` are
/// different predicates, and so are the same terms in another order.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Const(bool),
    Compare {
        lhs: Expr,
        op: CmpOp,
        rhs: Expr,
    },
    /// SQL `LIKE` with `%` and `_` wildcards
    Like {
        expr: Expr,
        pattern: CompactString,
    },
    Belongs {
        expr: Expr,
        values: Vec<Value>,
    },
    /// Membership of one value in a pipe-separated list column
    Contains {
        column: Column,
        value: Value,
    },
    IsNull(Expr),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(lhs: impl Into<Expr>, op: CmpOp, rhs: impl Into<Expr>) -> Self {
        Predicate::Compare {
            lhs: lhs.into(),
            op,
            rhs: rhs.into(),
        }
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(lhs, CmpOp::Eq, rhs)
    }

    pub fn ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(lhs, CmpOp::Ne, rhs)
    }

    pub fn lt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(lhs, CmpOp::Lt, rhs)
    }

    pub fn le(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(lhs, CmpOp::Le, rhs)
    }

    pub fn gt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(lhs, CmpOp::Gt, rhs)
    }

    pub fn ge(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(lhs, CmpOp::Ge, rhs)
    }

    pub fn like(expr: impl Into<Expr>, pattern: impl Into<CompactString>) -> Self {
        Predicate::Like {
            expr: expr.into(),
            pattern: pattern.into(),
        }
    }

    pub fn belongs<I, V>(expr: impl Into<Expr>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::Belongs {
            expr: expr.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(column: Column, value: impl Into<Value>) -> Self {
        Predicate::Contains {
            column,
            value: value.into(),
        }
    }

    pub fn is_null(expr: impl Into<Expr>) -> Self {
        Predicate::IsNull(expr.into())
    }

    /// `table.deleted <> 'T'`
    pub fn not_deleted(table: &TableRef) -> Self {
        Self::ne(table.column("deleted"), true)
    }

    /// Every column this predicate reads, in order of appearance.
    pub fn columns(&self) -> Vec<&Column> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a Column>) {
        match self {
            Predicate::Const(_) => {}
            Predicate::Compare { lhs, rhs, .. } => {
                out.extend(lhs.column());
                out.extend(rhs.column());
            }
            Predicate::Like { expr, .. }
            | Predicate::Belongs { expr, .. }
            | Predicate::IsNull(expr) => out.extend(expr.column()),
            Predicate::Contains { column, .. } => out.push(column),
            Predicate::And(l, r) | Predicate::Or(l, r) => {
                l.collect_columns(out);
                r.collect_columns(out);
            }
            Predicate::Not(p) => p.collect_columns(out),
        }
    }

    /// Number of leaf conditions.
    pub fn term_count(&self) -> usize {
        match self {
            Predicate::And(l, r) | Predicate::Or(l, r) => l.term_count() + r.term_count(),
            Predicate::Not(p) => p.term_count(),
            _ => 1,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Const(true) => f.write_str("(1=1)"),
            Predicate::Const(false) => f.write_str("(1=0)"),
            Predicate::Compare { lhs, op, rhs } => write!(f, "({lhs} {} {rhs})", op.as_sql()),
            Predicate::Like { expr, pattern } => {
                write!(f, "({expr} LIKE '{}')", pattern.replace('\'', "''"))
            }
            Predicate::Belongs { expr, values } => {
                write!(f, "({expr} IN (")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("))")
            }
            Predicate::Contains { column, value } => {
                let item = value.to_plain().unwrap_or_default();
                write!(f, "({column} LIKE '%|{}|%')", item.replace('\'', "''"))
            }
            Predicate::IsNull(expr) => write!(f, "({expr} IS NULL)"),
            Predicate::And(l, r) => write!(f, "({l} AND {r})"),
            Predicate::Or(l, r) => write!(f, "({l} OR {r})"),
            Predicate::Not(p) => write!(f, "(NOT {p})"),
        }
    }
}
