use super::UrlVars;
use super::expression::{UrlExpression, parse_expression};
use super::value::parse_value;
use crate::filter::{Filter, Operator, field};
use crate::multimap::OrderedMultiMap;
use crate::value::Value;

/// Whether a query var is a filter: its first selector is qualified with a
/// resource alias, a context or `~`.
pub fn is_filter_key(key: &str) -> bool {
    let expr = parse_expression(key);
    expr.selectors.first().is_some_and(|s| {
        s.starts_with('(') || s.starts_with('~') || s.contains('.')
    })
}

/// Parses the filter vars of a URL query, grouped by the alias of the
/// resource they apply to. `~`, context selectors and free joins belong to
/// `master_alias`.
///
/// Each occurrence of a key becomes one filter, so repeated keys are
/// combined with AND. Malformed values and unknown operators are skipped.
pub fn parse(vars: &UrlVars, master_alias: &str) -> OrderedMultiMap<Filter> {
    let mut filters = OrderedMultiMap::new();
    parse_each(vars, |selector, filter| {
        filters.append(alias_of(selector, master_alias), filter);
    });
    filters
}

/// All filters of a URL query as one tree, AND-ed in query order.
pub fn parse_url_query(vars: &UrlVars) -> Option<Filter> {
    let mut filters = Vec::new();
    parse_each(vars, |_, filter| filters.push(filter));
    Filter::all(filters)
}

/// Calls `emit` with the first selector and the filter of every key
/// occurrence.
fn parse_each(vars: &UrlVars, mut emit: impl FnMut(&str, Filter)) {
    for (key, values) in vars.iter() {
        if !is_filter_key(key) {
            continue;
        }
        let expr = parse_expression(key);
        let op = match Operator::from_name(&expr.op) {
            Ok(op) => op,
            Err(e) => {
                resq_warn!(key, error = %e, "resquery.url.skipped");
                continue;
            }
        };
        for value in values {
            let tokens = match parse_value(value) {
                Ok(tokens) => tokens,
                Err(e) => {
                    resq_warn!(key, error = %e, "resquery.url.skipped");
                    continue;
                }
            };
            if let Some(filter) = build(&expr, op, tokens) {
                emit(expr.selectors[0].as_str(), filter);
            }
        }
    }
}

fn alias_of<'a>(selector: &'a str, master_alias: &'a str) -> &'a str {
    if selector.starts_with('~') || selector.starts_with('(') {
        return master_alias;
    }
    match selector.split_once('.') {
        Some((prefix, _)) if !prefix.contains([':', '$']) => prefix,
        _ => master_alias,
    }
}

fn build(expr: &UrlExpression, op: Operator, tokens: Vec<Value>) -> Option<Filter> {
    let tokens: Vec<Value> = if op == Operator::Like {
        tokens
            .into_iter()
            .map(|v| match v {
                Value::Text(t) => Value::Text(t.replace('*', "%").into()),
                other => other,
            })
            .collect()
    } else {
        tokens
    };

    let compare = |selector: &str, value: Value| {
        let selector = field(selector);
        let selector = if op == Operator::Like {
            selector.lower()
        } else {
            selector
        };
        let filter = selector.compare(op, value);
        if expr.invert { !filter } else { filter }
    };

    let selectors = &expr.selectors;
    if matches!(op, Operator::Belongs | Operator::Contains | Operator::AnyOf) {
        let list = Value::List(tokens);
        return Filter::any(selectors.iter().map(|s| compare(s.as_str(), list.clone())));
    }
    if selectors.len() == 1 {
        return Filter::any(tokens.into_iter().map(|v| compare(selectors[0].as_str(), v)));
    }
    if tokens.len() > 1 {
        resq_warn!(
            selectors = selectors.len(),
            values = tokens.len(),
            "resquery.url.extra_values_ignored"
        );
    }
    let first = tokens.into_iter().next()?;
    Filter::any(selectors.iter().map(|s| compare(s.as_str(), first.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> UrlVars {
        pairs
            .iter()
            .map(|(k, v)| (*k, (*v).to_owned()))
            .collect()
    }

    fn parse_one(key: &str, value: &str) -> Filter {
        parse_url_query(&vars(&[(key, value)])).unwrap()
    }

    #[test]
    fn test_filter_keys() {
        assert!(is_filter_key("project.name"));
        assert!(is_filter_key("~.name__like"));
        assert!(is_filter_key("(organisation)$name"));
        assert!(!is_filter_key("name"));
        assert!(!is_filter_key("bbox"));
        assert!(!is_filter_key("organisation_id$name|task.name"));
    }

    #[test]
    fn test_grouped_by_alias() {
        let parsed = parse(
            &vars(&[
                ("project.name", "A"),
                ("task.name__like", "b*"),
                ("~.code", "C"),
                ("(organisation)$name", "D"),
                ("task_id:project_task.name", "E"),
                ("organisation_id$name.x", "F"),
            ]),
            "project",
        );
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["project", "task"]);
        assert_eq!(parsed.get("project").map(<[_]>::len), Some(5));
    }

    #[test]
    fn test_like_translates_wildcards() {
        assert_eq!(
            parse_one("project.name__like", "*Test*"),
            field("project.name").lower().like("%Test%")
        );
    }

    #[test]
    fn test_comma_values_are_alternatives() {
        assert_eq!(
            parse_one("project.name__like", "Test*,Other*"),
            field("project.name").lower().like("Test%")
                | field("project.name").lower().like("Other%")
        );
    }

    #[test]
    fn test_repeated_keys_are_conjuncts() {
        let query = vars(&[("project.name__like", "Test*"), ("project.name__like", "Other*")]);
        assert_eq!(
            parse_url_query(&query).unwrap(),
            field("project.name").lower().like("Test%")
                & field("project.name").lower().like("Other%")
        );
    }

    #[test]
    fn test_negation_per_comparison() {
        assert_eq!(
            parse_one("project.name|task.name__like!", "x*"),
            !field("project.name").lower().like("x%") | !field("task.name").lower().like("x%")
        );
        assert_eq!(parse_one("project.code!", "NONE"), !field("project.code").eq(Value::Null));
    }

    #[test]
    fn test_multiple_selectors_use_first_value() {
        assert_eq!(
            parse_one("project.code|task.code", "A,B"),
            field("project.code").eq("A") | field("task.code").eq("A")
        );
    }

    #[test]
    fn test_list_operators_take_the_list() {
        assert_eq!(
            parse_one("project.status__belongs", "1,2,NONE"),
            field("project.status").belongs(Value::List(vec![
                "1".into(),
                "2".into(),
                Value::Null
            ]))
        );
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let query = vars(&[
            ("project.name__like", "\"unterminated"),
            ("project.name__sounds", "x"),
            ("project.code", "ok"),
        ]);
        assert_eq!(parse_url_query(&query).unwrap(), field("project.code").eq("ok"));
    }
}
