//! Logical operators (AND, OR, NOT).
//!
//! ```ignore
//! // Function style
//! and([condition1, condition2])
//! or([condition1, condition2])
//! not(condition)
//!
//! // Operator style (via std::ops traits)
//! condition1 & condition2   // BitAnd
//! condition1 | condition2   // BitOr
//! !condition                // Not
//! ```
//!
//! Both styles build left-nested trees: `and([a, b, c])` is `(a & b) & c`.

use core::ops::{BitAnd, BitOr, Not};

use super::Predicate;

/// Left-folded conjunction, `None` for no conditions.
pub fn and<I>(conditions: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Predicate>,
{
    conditions.into_iter().reduce(|acc, p| acc & p)
}

/// Left-folded disjunction, `None` for no conditions.
pub fn or<I>(conditions: I) -> Option<Predicate>
where
    I: IntoIterator<Item = Predicate>,
{
    conditions.into_iter().reduce(|acc, p| acc | p)
}

pub fn not(condition: Predicate) -> Predicate {
    !condition
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    #[test]
    fn test_fold_is_left_nested() {
        let terms = || {
            ["a", "b", "c"]
                .into_iter()
                .map(|f| Predicate::eq(col("t", f), 1))
        };
        let mut it = terms();
        let (a, b, c) = (
            it.next().unwrap(),
            it.next().unwrap(),
            it.next().unwrap(),
        );
        assert_eq!(and(terms()), Some((a.clone() & b.clone()) & c.clone()));
        assert_eq!(or(terms()), Some((a | b) | c));
        assert_eq!(and(std::iter::empty()), None);
    }
}
