//! In-memory evaluation of filters against loaded rows, used for the parts
//! of a filter that involve virtual fields.

use super::{Comparison, Filter, Operand, Operator, Transform};
use crate::error::{QueryError, Result};
use crate::field::Scope;
use crate::rows::Row;
use crate::value::Value;
use regex::Regex;
use std::cmp::Ordering;

impl Filter {
    /// Whether `row` satisfies the filter. Columns missing from the row
    /// count as null.
    pub fn evaluate(&self, scope: &Scope<'_>, row: &Row) -> Result<bool> {
        Ok(match self {
            Filter::Comparison(c) => c.evaluate(scope, row)?,
            Filter::And(l, r) => l.evaluate(scope, row)? && r.evaluate(scope, row)?,
            Filter::Or(l, r) => l.evaluate(scope, row)? || r.evaluate(scope, row)?,
            Filter::Not(f) => !f.evaluate(scope, row)?,
        })
    }
}

impl Comparison {
    fn evaluate(&self, scope: &Scope<'_>, row: &Row) -> Result<bool> {
        let rfield = self.selector.resolve(scope)?;
        let lookup = |colname: &str| row.get(colname).cloned().unwrap_or(Value::Null);
        let transforms = self.selector.transforms();
        let fold = |v: Value| -> Value {
            transforms.iter().fold(v, |v, t| match t {
                Transform::Lower => v.to_lower(),
                Transform::Upper => v.to_upper(),
            })
        };

        let actual = fold(lookup(rfield.colname()));
        let expected: Vec<Value> = match &self.operand {
            Operand::Field(other) => {
                let other_field = other.resolve(scope)?;
                vec![other.fold(lookup(other_field.colname()))]
            }
            Operand::Value(_) => self
                .operand
                .values()
                .iter()
                .map(|v| fold(v.coerce(rfield.ftype())))
                .collect(),
        };

        // List-typed cells match a scalar condition if any item does
        let items: Vec<Value> = match actual {
            Value::List(items) => items,
            scalar => vec![scalar],
        };

        Ok(match self.op {
            Operator::Eq if self.operand.is_list() => {
                items.iter().any(|a| expected.iter().any(|e| equal(a, e)))
            }
            Operator::Ne if self.operand.is_list() => {
                !items.iter().any(|a| expected.iter().any(|e| equal(a, e)))
            }
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                let Some(e) = expected.first() else {
                    return Ok(false);
                };
                let test = |a: &Value| match self.op {
                    Operator::Eq => equal(a, e),
                    Operator::Ne => !equal(a, e),
                    Operator::Lt => a.compare(e) == Some(Ordering::Less),
                    Operator::Le => matches!(a.compare(e), Some(Ordering::Less | Ordering::Equal)),
                    Operator::Gt => a.compare(e) == Some(Ordering::Greater),
                    _ => matches!(a.compare(e), Some(Ordering::Greater | Ordering::Equal)),
                };
                if self.op == Operator::Ne {
                    items.iter().all(test)
                } else {
                    items.iter().any(test)
                }
            }
            Operator::Like => {
                let matchers = expected
                    .iter()
                    .map(|p| like_matcher(&p.to_plain().unwrap_or_default()))
                    .collect::<Result<Vec<_>>>()?;
                items.iter().any(|a| {
                    a.to_plain()
                        .is_some_and(|text| matchers.iter().any(|m| m.is_match(&text)))
                })
            }
            Operator::Belongs | Operator::AnyOf => {
                items.iter().any(|a| expected.iter().any(|e| equal(a, e)))
            }
            Operator::Contains if rfield.ftype().is_list() => expected
                .iter()
                .all(|e| items.iter().any(|a| equal(a, e))),
            Operator::Contains => expected.iter().all(|e| {
                let needle = e.to_plain().unwrap_or_default();
                items
                    .iter()
                    .any(|a| a.to_plain().is_some_and(|text| text.contains(needle.as_str())))
            }),
        })
    }
}

fn equal(a: &Value, b: &Value) -> bool {
    a.compare(b) == Some(Ordering::Equal)
}

/// Anchored regex equivalent of an SQL `LIKE` pattern.
fn like_matcher(pattern: &str) -> Result<Regex> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => re.push_str(".*"),
            '_' => re.push('.'),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|e| QueryError::InvalidPattern(e.to_string()))
}
