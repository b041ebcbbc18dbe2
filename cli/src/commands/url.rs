//! Url command implementation
//!
//! Parses a URL query into the filters of a table and serializes them back,
//! yielding the normalized form of the query.

use resquery::Resource;
use resquery::schema::Schema;
use resquery::url::{parse_url, to_query_string};

use crate::error::CliError;
use crate::output;

/// Run the url command
pub fn run(schema: &Schema, table: &str, query: &str, verbose: bool) -> Result<(), CliError> {
    let vars = parse_url(query);
    let resource = Resource::new(schema, table)?.with_url_vars(&vars);

    if verbose {
        for filter in resource.rfilter().filters() {
            eprintln!("{} {}", output::note("filter"), filter);
        }
    }

    println!("{}", to_query_string(&resource.serialize_url()));
    Ok(())
}
