//! Compilation of filters into engine predicates and join plans.

use super::{Comparison, FieldSelector, Filter, Operand, Operator};
use crate::error::{QueryError, Result};
use crate::expr::{self, CmpOp, Expr, Predicate};
use crate::field::{ResourceField, Scope};
use crate::join::{InnerJoins, LeftJoins};
use crate::value::Value;
use compact_str::{CompactString, format_compact};

/// Joins a filter needs, collected from all of its selectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Joins {
    pub inner: InnerJoins,
    pub left: LeftJoins,
    /// Some join may multiply rows of the base table
    pub distinct: bool,
}

impl Joins {
    pub fn merge(&mut self, other: Joins) {
        self.inner.merge(other.inner);
        self.left.merge(other.left);
        self.distinct |= other.distinct;
    }
}

impl Filter {
    /// Compiles the filter into a predicate, resolving every selector
    /// against `scope`. Virtual fields are rejected, see [`Filter::split`].
    pub fn query(&self, scope: &Scope<'_>) -> Result<Predicate> {
        Ok(match self {
            Filter::Comparison(c) => c.query(scope)?,
            Filter::And(l, r) => l.query(scope)? & r.query(scope)?,
            Filter::Or(l, r) => l.query(scope)? | r.query(scope)?,
            Filter::Not(f) => !f.query(scope)?,
        })
    }

    /// Join plan needed to evaluate the filter against `scope`. Fragments
    /// of later selectors are appended after earlier ones, duplicates kept.
    pub fn joins(&self, scope: &Scope<'_>) -> Result<Joins> {
        let mut joins = Joins::default();
        for selector in self.selectors() {
            let rfield = selector.resolve(scope)?;
            if rfield.tname() == scope.table().alias() {
                continue;
            }
            joins.inner.merge(rfield.join);
            joins.left.merge(rfield.left);
            joins.distinct |= rfield.distinct;
        }
        Ok(joins)
    }

    /// Separates the top-level conjuncts that can go to the store from those
    /// that touch virtual fields and must be evaluated on loaded rows.
    pub fn split(&self, scope: &Scope<'_>) -> Result<(Option<Filter>, Option<Filter>)> {
        let mut db = Vec::new();
        let mut virtual_terms = Vec::new();
        for conjunct in self.conjuncts() {
            let mut is_virtual = false;
            for selector in conjunct.selectors() {
                is_virtual |= selector.resolve(scope)?.is_virtual();
            }
            if is_virtual {
                virtual_terms.push(conjunct.clone());
            } else {
                db.push(conjunct.clone());
            }
        }
        Ok((Filter::all(db), Filter::all(virtual_terms)))
    }
}

impl Comparison {
    pub fn query(&self, scope: &Scope<'_>) -> Result<Predicate> {
        let rfield = self.selector.resolve(scope)?;
        let lhs = self.column_expr(&self.selector, &rfield)?;

        if let Operand::Field(other) = &self.operand {
            let other_field = other.resolve(scope)?;
            let rhs = self.column_expr(other, &other_field)?;
            let op = self.cmp_op().ok_or_else(|| self.invalid())?;
            return Ok(Predicate::compare(lhs, op, rhs));
        }

        let ftype = rfield.ftype();
        let text = ftype.is_text();
        let value = |v: &Value| {
            let v = v.coerce(ftype);
            if text { self.selector.fold(v) } else { v }
        };
        let values = self.operand.values();

        match self.op {
            Operator::Eq | Operator::Ne if self.operand.is_list() => {
                let belongs = self.belongs(lhs, values.iter().map(value).collect());
                Ok(if self.op == Operator::Ne { !belongs } else { belongs })
            }
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                let op = self.cmp_op().ok_or_else(|| self.invalid())?;
                let [v] = values else {
                    return Err(self.invalid());
                };
                Ok(match (op, value(v)) {
                    (CmpOp::Eq, Value::Null) => Predicate::is_null(lhs),
                    (CmpOp::Ne, Value::Null) => !Predicate::is_null(lhs),
                    (op, v) => Predicate::compare(lhs, op, v),
                })
            }
            Operator::Like => {
                let patterns = values.iter().map(|v| {
                    let pattern = if text { self.selector.fold(v.clone()) } else { v.clone() };
                    Predicate::like(lhs.clone(), pattern.to_plain().unwrap_or_default())
                });
                Ok(expr::or(patterns).unwrap_or(Predicate::Const(false)))
            }
            Operator::Belongs | Operator::AnyOf => {
                if ftype.is_list() {
                    return Ok(self.list_membership(&rfield, values, false));
                }
                Ok(self.belongs(lhs, values.iter().map(value).collect()))
            }
            Operator::Contains => {
                if ftype.is_list() {
                    return Ok(self.list_membership(&rfield, values, true));
                }
                if !text {
                    return Err(self.invalid());
                }
                let terms = values.iter().map(|v| {
                    let item = value(v).to_plain().unwrap_or_default();
                    Predicate::like(lhs.clone(), format_compact!("%{item}%"))
                });
                Ok(expr::and(terms).unwrap_or(Predicate::Const(false)))
            }
        }
    }

    fn column_expr(&self, selector: &FieldSelector, rfield: &ResourceField) -> Result<Expr> {
        if rfield.is_virtual() {
            return Err(QueryError::VirtualField(CompactString::from(selector.name())));
        }
        Ok(selector.apply(rfield.column().into(), rfield.ftype().is_text()))
    }

    fn cmp_op(&self) -> Option<CmpOp> {
        Some(match self.op {
            Operator::Eq => CmpOp::Eq,
            Operator::Ne => CmpOp::Ne,
            Operator::Lt => CmpOp::Lt,
            Operator::Le => CmpOp::Le,
            Operator::Gt => CmpOp::Gt,
            Operator::Ge => CmpOp::Ge,
            _ => return None,
        })
    }

    fn invalid(&self) -> QueryError {
        QueryError::InvalidOperator {
            op: self.op.as_str(),
            selector: self.selector.name().into(),
        }
    }

    /// `IN (...)`, with nulls matched through `IS NULL`.
    fn belongs(&self, lhs: Expr, values: Vec<Value>) -> Predicate {
        let (nulls, values): (Vec<Value>, Vec<Value>) =
            values.into_iter().partition(Value::is_null);
        let membership = (!values.is_empty()).then(|| Predicate::belongs(lhs.clone(), values));
        let null_check = (!nulls.is_empty()).then(|| Predicate::is_null(lhs));
        match (null_check, membership) {
            (Some(n), Some(m)) => n | m,
            (Some(n), None) => n,
            (None, Some(m)) => m,
            (None, None) => Predicate::Const(false),
        }
    }

    /// Membership tests on a list column, all values (`contains`) or any.
    /// No values match nothing.
    fn list_membership(&self, rfield: &ResourceField, values: &[Value], all: bool) -> Predicate {
        let element = rfield.ftype().element_type();
        let column = rfield.column();
        let terms = values
            .iter()
            .map(|v| Predicate::contains(column.clone(), v.coerce(&element)));
        let combined = if all { expr::and(terms) } else { expr::or(terms) };
        combined.unwrap_or(Predicate::Const(false))
    }
}
