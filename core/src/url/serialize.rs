use super::UrlVars;
use super::value::encode_token;
use crate::filter::{Comparison, Filter, Operand, Operator};
use crate::value::Value;
use compact_str::{CompactString, format_compact};

/// Projects a filter onto URL query vars, one entry per top-level conjunct.
///
/// A conjunct is representable when it is an OR of comparisons, possibly
/// negated one by one, sharing operator and negation and comparing with
/// literal values: either one selector against several values, or several
/// selectors against the same value. Conjuncts of any other shape are left
/// out. With `prefix_master`, selectors not qualified with an alias are
/// prefixed with `~.` so they parse back as filters of the master resource.
pub fn serialize(filter: &Filter, prefix_master: bool) -> UrlVars {
    let mut vars = UrlVars::new();
    for conjunct in filter.conjuncts() {
        match serialize_conjunct(conjunct, prefix_master) {
            Some((key, value)) => vars.append(key, value),
            None => {
                resq_debug!(filter = %conjunct, "resquery.url.not_serializable");
            }
        }
    }
    vars
}

/// Inverse of [`parse_url_query`](super::parse_url_query) on its output.
pub fn serialize_url_query(filter: &Filter) -> UrlVars {
    serialize(filter, false)
}

fn serialize_conjunct(filter: &Filter, prefix_master: bool) -> Option<(CompactString, String)> {
    let mut leaves = Vec::new();
    collect_leaves(filter, &mut leaves)?;
    let (first_negated, first) = *leaves.first()?;
    if leaves
        .iter()
        .any(|(negated, c)| *negated != first_negated || c.op != first.op)
    {
        return None;
    }
    if leaves.iter().any(|(_, c)| matches!(c.operand, Operand::Field(_))) {
        return None;
    }

    let op = first.op;
    let list_op = matches!(op, Operator::Belongs | Operator::Contains | Operator::AnyOf);
    let shared_operand = leaves.iter().all(|(_, c)| c.operand == first.operand)
        && (list_op || !first.operand.is_list());

    // Several selectors against one operand keep their order and repeats,
    // one selector against several values lists the values.
    let (selectors, values): (Vec<&str>, Vec<&Value>) = if shared_operand {
        (
            leaves.iter().map(|(_, c)| c.selector.name()).collect(),
            first.operand.values().iter().collect(),
        )
    } else if leaves.iter().all(|(_, c)| c.selector.name() == first.selector.name()) {
        if op == Operator::Contains {
            return None;
        }
        (
            vec![first.selector.name()],
            leaves.iter().flat_map(|(_, c)| c.operand.values()).collect(),
        )
    } else {
        return None;
    };
    if values.is_empty() {
        return None;
    }

    let selectors: Vec<CompactString> = selectors
        .into_iter()
        .map(|name| qualify(name, prefix_master))
        .collect();
    let mut key = CompactString::from(selectors.join("|"));
    // A selector ending in `!` needs the separator to not read as negation.
    if op != Operator::Eq || key.ends_with('!') {
        key.push_str(&format_compact!("__{}", op.as_str()));
    }
    if first_negated {
        key.push('!');
    }

    let tokens: Vec<String> = values
        .into_iter()
        .map(|v| {
            let token = encode_token(v);
            if op == Operator::Like {
                token.replace('%', "*")
            } else {
                token
            }
        })
        .collect();
    Some((key, tokens.join(",")))
}

/// Flattens an OR tree into `(negated, comparison)` leaves.
fn collect_leaves<'f>(filter: &'f Filter, out: &mut Vec<(bool, &'f Comparison)>) -> Option<()> {
    match filter {
        Filter::Comparison(c) => out.push((false, c)),
        Filter::Not(inner) => match inner.as_ref() {
            Filter::Comparison(c) => out.push((true, c)),
            _ => return None,
        },
        Filter::Or(l, r) => {
            collect_leaves(l, out)?;
            collect_leaves(r, out)?;
        }
        Filter::And(..) => return None,
    }
    Some(())
}

fn qualify(selector: &str, prefix_master: bool) -> CompactString {
    if prefix_master
        && !selector.contains('.')
        && !selector.starts_with('(')
        && !selector.starts_with('~')
    {
        format_compact!("~.{selector}")
    } else {
        selector.into()
    }
}
