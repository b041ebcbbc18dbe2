//! URL query codec.
//!
//! Filters travel in request query strings as flat key/value pairs:
//!
//! ```text
//! project.organisation_id$name|task.description__like!=Test*,"a,b",NONE
//! ```
//!
//! The key names selectors, an operator and an optional negation (see
//! [`parse_expression`]), the value is a comma-separated token list (see
//! [`parse_value`]). [`parse`] turns query vars into filters grouped by the
//! resource alias they apply to, and [`serialize`] projects a filter back
//! onto query vars where the flat form can express it. A `bbox` var
//! restricts located tables to a [`BoundingBox`].

mod bbox;
mod expression;
mod query;
mod serialize;
mod value;

pub use bbox::{BBOX_KEY, BoundingBox, LOCATION_FIELD};
pub use expression::{UrlExpression, parse_expression};
pub use query::{is_filter_key, parse, parse_url_query};
pub use serialize::{serialize, serialize_url_query};
pub use value::{parse_value, parse_values};

use crate::multimap::OrderedMultiMap;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Query vars: keys in first-seen order, every occurrence of a key kept.
pub type UrlVars = OrderedMultiMap<String>;

/// Characters escaped when rendering query vars. Selector syntax stays
/// readable.
const QUERY_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Splits a URL (or a bare query string) into query vars. Keys without a
/// value are dropped, `+` decodes to a space.
pub fn parse_url(url: &str) -> UrlVars {
    let query = match url.split_once('?') {
        Some((_, query)) => query,
        None if url.contains('=') => url,
        None => return UrlVars::new(),
    };

    let mut vars = UrlVars::new();
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let key = decode(key);
        if key.is_empty() {
            continue;
        }
        vars.append(key, decode(value));
    }
    vars
}

/// Renders query vars as a query string, in key order.
pub fn to_query_string(vars: &UrlVars) -> String {
    let mut out = String::new();
    for (key, values) in vars.iter() {
        for value in values {
            if !out.is_empty() {
                out.push('&');
            }
            out.extend(utf8_percent_encode(key, QUERY_ENCODE));
            out.push('=');
            out.extend(utf8_percent_encode(value, QUERY_ENCODE));
        }
    }
    out
}

fn decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}
