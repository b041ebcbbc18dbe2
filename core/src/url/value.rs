use crate::error::{QueryError, Result};
use crate::value::Value;

/// Tokenizes a URL filter value: comma-separated, tokens optionally in
/// double quotes with `\"` and `\\` escapes. Unquoted `NONE` and `None` are
/// null, quoted they are plain text.
pub fn parse_value(value: &str) -> Result<Vec<Value>> {
    let malformed = |reason| QueryError::MalformedUrlQueryValue {
        value: value.to_owned(),
        reason,
    };

    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => match chars.next() {
                Some(escaped) => token.push(escaped),
                None => return Err(malformed("dangling escape")),
            },
            '"' if in_quotes => in_quotes = false,
            '"' if token.is_empty() && !quoted => {
                in_quotes = true;
                quoted = true;
            }
            ',' if !in_quotes => {
                tokens.push(finish(std::mem::take(&mut token), quoted));
                quoted = false;
            }
            c => token.push(c),
        }
    }
    if in_quotes {
        return Err(malformed("unterminated quote"));
    }
    tokens.push(finish(token, quoted));
    Ok(tokens)
}

/// [`parse_value`] over every occurrence of a key, tokens concatenated.
pub fn parse_values<S: AsRef<str>>(values: &[S]) -> Result<Vec<Value>> {
    let mut out = Vec::new();
    for value in values {
        out.extend(parse_value(value.as_ref())?);
    }
    Ok(out)
}

fn finish(token: String, quoted: bool) -> Value {
    if !quoted && (token == "NONE" || token == "None") {
        Value::Null
    } else {
        Value::Text(token.into())
    }
}

/// Inverse of [`parse_value`] for a single token.
pub(crate) fn encode_token(value: &Value) -> String {
    let Some(text) = value.to_plain() else {
        return "NONE".to_owned();
    };
    let needs_quotes = text.contains([',', '"', '\\'])
        || text == "NONE"
        || text == "None"
        || text.starts_with('"');
    if !needs_quotes {
        return text.into();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
