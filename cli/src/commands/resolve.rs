//! Resolve command implementation
//!
//! Shows the column each selector resolves to and the joins that reach it.

use resquery::Resource;
use resquery::schema::Schema;

use crate::error::CliError;
use crate::output;

/// Run the resolve command
pub fn run(schema: &Schema, table: &str, selectors: &[String]) -> Result<(), CliError> {
    let resource = Resource::new(schema, table)?;

    for selector in selectors {
        let rfield = resource.resolve(selector)?;

        println!("{}", output::section(rfield.selector()));
        println!("{}", output::field("column", rfield.colname()));
        println!("{}", output::field("type", rfield.ftype()));
        if rfield.is_virtual() {
            println!("{}", output::field("virtual", output::flag(true)));
        }
        println!("{}", output::field("distinct", output::flag(rfield.distinct())));
        println!("{}", output::field("multiple", output::flag(rfield.multiple())));

        let joins = rfield.left().as_list();
        if joins.is_empty() {
            println!("  {}", output::note("no joins"));
        }
        for join in joins {
            println!("{}", output::join("LEFT JOIN", join));
        }
        println!();
    }

    Ok(())
}
