//! Terminal rendering of resolved fields and query plans.

use colored::{ColoredString, Colorize};
use std::fmt::Display;

/// Title line of a selector or plan section.
pub fn section(title: &str) -> ColoredString {
    title.bold().cyan()
}

/// `  name: value`
pub fn field(name: &str, value: impl Display) -> String {
    format!("  {}: {}", name.blue(), value)
}

pub fn flag(value: bool) -> ColoredString {
    if value { "yes".green() } else { "no".dimmed() }
}

/// Indented join line, e.g. `  LEFT JOIN org_organisation ON (...)`.
pub fn join(keyword: &str, join: impl Display) -> String {
    format!("  {} {}", keyword.blue(), join)
}

/// Secondary text: absent joins, unconstrained axes, verbose listings.
pub fn note(text: &str) -> ColoredString {
    text.dimmed()
}

/// A query var the command does not use.
pub fn ignored_var(key: &str) -> String {
    format!("{} '{key}' is not a filter, ignored", "warning:".yellow().bold())
}
