//! Literal values carried by filters, compiled predicates and rows.

use crate::schema::FieldType;
use compact_str::{CompactString, ToCompactString};
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(CompactString),
    List(Vec<Value>),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Plain string form without quoting, `None` for null.
    pub fn to_plain(&self) -> Option<CompactString> {
        match self {
            Value::Null => None,
            Value::Bool(true) => Some(CompactString::const_new("True")),
            Value::Bool(false) => Some(CompactString::const_new("False")),
            Value::Int(i) => Some(i.to_compact_string()),
            Value::Float(f) => Some(f.to_compact_string()),
            Value::Text(s) => Some(s.clone()),
            Value::List(items) => {
                let parts: Vec<CompactString> = items
                    .iter()
                    .map(|v| v.to_plain().unwrap_or_default())
                    .collect();
                Some(parts.join(",").into())
            }
        }
    }

    /// Lower-cases text, leaves everything else alone.
    pub fn to_lower(&self) -> Value {
        match self {
            Value::Text(s) => Value::Text(s.to_lowercase().into()),
            Value::List(items) => Value::List(items.iter().map(Value::to_lower).collect()),
            other => other.clone(),
        }
    }

    /// Upper-cases text, leaves everything else alone.
    pub fn to_upper(&self) -> Value {
        match self {
            Value::Text(s) => Value::Text(s.to_uppercase().into()),
            Value::List(items) => Value::List(items.iter().map(Value::to_upper).collect()),
            other => other.clone(),
        }
    }

    /// Converts text received from the outside into the representation of
    /// `ftype`. Values that do not parse are kept as they are.
    pub fn coerce(&self, ftype: &FieldType) -> Value {
        if let Value::List(items) = self {
            return Value::List(items.iter().map(|v| v.coerce(ftype)).collect());
        }
        let Value::Text(s) = self else {
            return self.clone();
        };
        match ftype.element_type() {
            FieldType::Id | FieldType::Integer | FieldType::Reference(_) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| self.clone()),
            FieldType::Double => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or_else(|_| self.clone()),
            FieldType::Boolean => match s.trim() {
                "true" | "True" | "TRUE" | "T" | "1" => Value::Bool(true),
                "false" | "False" | "FALSE" | "F" | "0" => Value::Bool(false),
                _ => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Loose comparison used when evaluating filters against loaded rows.
    ///
    /// Numbers compare numerically across `Int` and `Float`, text that parses
    /// as a number compares with numbers, nulls are only equal to nulls.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Text(_), Value::Int(_) | Value::Float(_)) => {
                other.compare(self).map(Ordering::reverse)
            }
            (Value::Int(_) | Value::Float(_), Value::Text(t)) => {
                let parsed = t.trim().parse::<f64>().ok()?;
                self.compare(&Value::Float(parsed))
            }
            (Value::Bool(b), Value::Text(_) | Value::Int(_)) => {
                let other = other.coerce(&FieldType::Boolean);
                match other {
                    Value::Bool(o) => Some(b.cmp(&o)),
                    Value::Int(i) => Some((*b as i64).cmp(&i)),
                    _ => None,
                }
            }
            (Value::Text(_) | Value::Int(_), Value::Bool(_)) => {
                other.compare(self).map(Ordering::reverse)
            }
            _ => None,
        }
    }

    /// Key under which this value is collected into value sets.
    pub(crate) fn set_key(&self) -> CompactString {
        match self {
            Value::Float(f) if f.fract() == 0.0 => (*f as i64).to_compact_string(),
            other => other.to_plain().unwrap_or_else(|| CompactString::const_new("None")),
        }
    }
}

impl fmt::Display for Value {
    /// SQL literal form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(true) => f.write_str("'T'"),
            Value::Bool(false) => f.write_str("'F'"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into())
    }
}

impl From<CompactString> for Value {
    fn from(s: CompactString) -> Self {
        Value::Text(s)
    }
}

impl From<&CompactString> for Value {
    fn from(s: &CompactString) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_text_to_field_types() {
        assert_eq!(Value::from("12").coerce(&FieldType::Integer), Value::Int(12));
        assert_eq!(
            Value::from("12").coerce(&FieldType::Reference("org_organisation".into())),
            Value::Int(12)
        );
        assert_eq!(Value::from("x12").coerce(&FieldType::Id), Value::from("x12"));
        assert_eq!(Value::from("True").coerce(&FieldType::Boolean), Value::Bool(true));
        assert_eq!(Value::from("1.5").coerce(&FieldType::Double), Value::Float(1.5));
        assert_eq!(
            Value::from("3").coerce(&FieldType::ListReference("hrm_skill".into())),
            Value::Int(3)
        );
        assert_eq!(Value::from("3").coerce(&FieldType::String), Value::from("3"));
    }

    #[test]
    fn test_sql_literals() {
        assert_eq!(Value::from("O'Neil").to_string(), "'O''Neil'");
        assert_eq!(Value::Bool(true).to_string(), "'T'");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "(1,2)");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_loose_compare() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.0)), Some(Ordering::Equal));
        assert_eq!(Value::Int(2).compare(&Value::from("3")), Some(Ordering::Less));
        assert_eq!(Value::from("3").compare(&Value::Int(2)), Some(Ordering::Greater));
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Bool(true).compare(&Value::from("True")), Some(Ordering::Equal));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_untagged_json() {
        let value: Value = serde_json::from_str(r#"[1, "a", null, true]"#).unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::Int(1), Value::from("a"), Value::Null, Value::Bool(true)])
        );
    }
}
