//! Explain command implementation
//!
//! Compiles a URL query against a table and prints the query plan.

use compact_str::CompactString;
use resquery::schema::Schema;
use resquery::url::{BBOX_KEY, is_filter_key, parse_url};
use resquery::{AxisFilter, AxisValues, Resource};
use std::collections::BTreeSet;

use crate::error::CliError;
use crate::output;

/// Run the explain command
pub fn run(
    schema: &Schema,
    table: &str,
    query: Option<&str>,
    fields: &[String],
    axis: Option<&str>,
) -> Result<(), CliError> {
    let vars = query.map(parse_url).unwrap_or_default();
    let resource = Resource::new(schema, table)?.with_url_vars(&vars);
    let located = resource.rfilter().bbox().is_some();
    for key in vars
        .keys()
        .filter(|k| !is_filter_key(k) && !(located && *k == BBOX_KEY))
    {
        println!("{}", output::ignored_var(key));
    }
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    let plan = resource.plan(&fields)?;

    println!("{}", output::section("Query plan"));
    println!("  {plan}");
    println!();
    println!("{}", output::field("distinct", output::flag(plan.distinct)));
    println!("{}", output::field("joins", plan.joins.len()));
    if let Some(vfilter) = resource.rfilter().virtual_filter()? {
        println!("{}", output::field("in memory", vfilter));
    }

    if let Some(selector) = axis {
        let rfield = resource.resolve(selector)?;
        let values = AxisFilter::for_resource(&resource)?.values(&rfield);
        let join = |set: &BTreeSet<CompactString>| {
            set.iter().map(CompactString::as_str).collect::<Vec<_>>().join(", ")
        };
        let shown = match &values {
            AxisValues::Unconstrained => output::note("unconstrained").to_string(),
            AxisValues::Only(set) => join(set),
            AxisValues::Except(set) => format!("all except {}", join(set)),
        };
        println!("{}", output::field(&format!("axis {selector}"), shown));
    }

    Ok(())
}
