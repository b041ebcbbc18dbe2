//! Field selector grammar.
//!
//! ```text
//! selector  := [prefix] { hop } field
//! prefix    := "~."                       master resource
//!            | "(" name ")" [ rest ]      named context, expanded per table
//! hop       := alias "."                  component of the current table
//!            | fkey ":" table "."         free join on table.fkey = current.id
//!            | fkey "$"                   follow a foreign key
//! ```
//!
//! `organisation_id$name`, `office.name`, `task.project_id$name`,
//! `person_id:hrm_human_resource.organisation_id`, `(organisation)$name`.

use crate::error::{QueryError, Result};
use smallvec::SmallVec;

/// One step of a selector path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hop<'a> {
    /// `alias.`
    Component(&'a str),
    /// `fkey:table.`
    Join { fkey: &'a str, table: &'a str },
    /// `fkey$`
    Reference(&'a str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prefix<'a> {
    None,
    /// `~.`
    Master,
    /// `(name)` followed by the unparsed `rest`, which is empty or starts with
    /// `$` or `.`
    Context { name: &'a str, rest: &'a str },
}

/// A parsed selector. Context selectors stay unparsed after the prefix
/// until the context is expanded for a concrete table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector<'a> {
    pub prefix: Prefix<'a>,
    pub hops: SmallVec<[Hop<'a>; 4]>,
    pub field: &'a str,
}

impl<'a> Selector<'a> {
    pub fn parse(selector: &'a str) -> Result<Self> {
        let invalid = |reason: &str| QueryError::unresolvable(selector, reason);

        if selector.is_empty() {
            return Err(invalid("empty selector"));
        }

        if let Some(inner) = selector.strip_prefix('(') {
            let (name, rest) = inner
                .split_once(')')
                .ok_or_else(|| invalid("unclosed context"))?;
            if !is_name(name) {
                return Err(invalid("invalid context name"));
            }
            if !(rest.is_empty() || rest.starts_with('$') || rest.starts_with('.')) {
                return Err(invalid("context must be followed by `$` or `.`"));
            }
            return Ok(Selector {
                prefix: Prefix::Context { name, rest },
                hops: SmallVec::new(),
                field: "",
            });
        }

        let mut prefix = Prefix::None;
        let mut path = selector;
        if let Some(rest) = selector.strip_prefix('~') {
            path = rest
                .strip_prefix('.')
                .ok_or_else(|| invalid("`~` must be followed by `.`"))?;
            prefix = Prefix::Master;
        }

        let mut hops = SmallVec::new();
        let mut start = 0;
        for (i, c) in path.char_indices() {
            if c != '.' && c != '$' {
                continue;
            }
            let segment = &path[start..i];
            start = i + 1;
            let hop = match c {
                '$' => Hop::Reference(segment),
                _ => match segment.split_once(':') {
                    Some((fkey, table)) => {
                        if !is_name(fkey) || !is_name(table) {
                            return Err(invalid("invalid join segment"));
                        }
                        hops.push(Hop::Join { fkey, table });
                        continue;
                    }
                    None => Hop::Component(segment),
                },
            };
            if !is_name(segment) {
                return Err(invalid("empty or invalid path segment"));
            }
            hops.push(hop);
        }

        let field = &path[start..];
        if !is_name(field) {
            return Err(invalid("missing or invalid field name"));
        }
        Ok(Selector {
            prefix,
            hops,
            field,
        })
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Name of the context a selector starts with, if any.
pub fn context_name(selector: &str) -> Option<&str> {
    let inner = selector.strip_prefix('(')?;
    inner.split_once(')').map(|(name, _)| name)
}
