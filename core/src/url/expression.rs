use compact_str::CompactString;
use smallvec::SmallVec;

/// The key of a URL filter: `selector(|selector)*(__operator)?(!)?`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlExpression {
    pub selectors: SmallVec<[CompactString; 2]>,
    pub op: CompactString,
    pub invert: bool,
}

/// Splits a URL filter key into selectors, operator name and negation.
///
/// The operator follows the first `__`. Underscores around it are ignored,
/// an empty operator means `eq`, and a trailing `!` negates. A `!` before
/// the `__` belongs to the selector.
///
/// ```
/// # use resquery_core::url::parse_expression;
/// let expr = parse_expression("project.name|task.name__like!");
/// assert_eq!(expr.selectors.as_slice(), ["project.name", "task.name"]);
/// assert_eq!(expr.op, "like");
/// assert!(expr.invert);
/// ```
pub fn parse_expression(key: &str) -> UrlExpression {
    let (selectors, op, invert) = match key.split_once("__") {
        Some((selectors, op)) => {
            let (op, invert) = match op.strip_suffix('!') {
                Some(op) => (op, true),
                None => (op, false),
            };
            (selectors, op.trim_matches('_'), invert)
        }
        None => match key.strip_suffix('!') {
            Some(selectors) => (selectors, "", true),
            None => (key, "", false),
        },
    };
    UrlExpression {
        selectors: selectors
            .split('|')
            .filter(|s| !s.is_empty())
            .map(CompactString::from)
            .collect(),
        op: if op.is_empty() {
            CompactString::const_new("eq")
        } else {
            op.into()
        },
        invert,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expression() {
        let cases: &[(&str, &[&str], &str, bool)] = &[
            ("s", &["s"], "eq", false),
            ("s!", &["s"], "eq", true),
            ("s__op", &["s"], "op", false),
            ("s__op!", &["s"], "op", true),
            ("s1|s2|s3", &["s1", "s2", "s3"], "eq", false),
            ("s1|s2|s3!", &["s1", "s2", "s3"], "eq", true),
            ("s1|s2|s3__op", &["s1", "s2", "s3"], "op", false),
            ("s1|s2|s3__op!", &["s1", "s2", "s3"], "op", true),
            ("s__", &["s"], "eq", false),
            ("s___", &["s"], "eq", false),
            ("s_____ne", &["s"], "ne", false),
            ("s__!", &["s"], "eq", true),
            ("s!__op", &["s!"], "op", false),
            ("s__!op", &["s"], "!op", false),
            ("s1||s3", &["s1", "s3"], "eq", false),
        ];
        for (key, selectors, op, invert) in cases {
            let expr = parse_expression(key);
            assert_eq!(expr.selectors.as_slice(), *selectors, "{key}");
            assert_eq!(expr.op, *op, "{key}");
            assert_eq!(expr.invert, *invert, "{key}");
        }
    }
}
