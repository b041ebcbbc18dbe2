//! # resquery
//!
//! Field selector resolution, join planning and filter composition for
//! resources over a relational store.
//!
//! ## Quick Start
//!
//! ```rust
//! use resquery::prelude::*;
//!
//! # fn main() -> resquery::Result<()> {
//! let schema = Schema::builder()
//!     .table(TableDef::new("org_organisation").field("name", FieldType::String))
//!     .table(
//!         TableDef::new("project_project")
//!             .field("name", FieldType::String)
//!             .field("organisation_id", FieldType::Reference("org_organisation".into())),
//!     )
//!     .build()?;
//!
//! let vars = parse_url("/project/project?project.organisation_id$name__like=red*");
//! let projects = Resource::new(&schema, "project_project")?.with_url_vars(&vars);
//!
//! let (_, left) = projects.rfilter().effective_joins()?;
//! assert_eq!(left[0].table.name(), "org_organisation");
//! println!("{}", projects.plan(&["name", "organisation_id$name"])?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Selectors
//!
//! | Selector                      | Meaning                                          |
//! |-------------------------------|--------------------------------------------------|
//! | `name`                        | field of the resource table                      |
//! | `organisation_id$name`        | field of the table a foreign key references      |
//! | `task.description`            | field of the component registered as `task`      |
//! | `person_id:hrm_human_resource.type` | field of a table joined on its `person_id` |
//! | `(organisation)$name`         | field reached through a named context            |
//! | `~.name`                      | field of the resource table, explicitly          |

/// Result type for resolution and compilation
pub use resquery_core::error::Result;

/// Error types
pub mod error {
    pub use resquery_core::error::QueryError;
}

/// Schema description and component registry
pub use resquery_core::schema;

/// Engine-level predicates, as handed to the storage engine
pub use resquery_core::expr;

/// Filters over field selectors
pub use resquery_core::filter;

/// URL query codec
pub use resquery_core::url;

/// Resources, their filters and access policies
pub use resquery_core::resource;

pub use resquery_core::{
    AxisFilter, AxisValues, ContextGuard, QueryPlan, Resource, ResourceField, ResourceFilter, Row,
    Scope, Value, clear_global_context, global_context, set_global_context,
};

/// Everything needed to describe a schema and query resources.
pub mod prelude {
    pub use resquery_core::prelude::*;
    pub use resquery_core::url::{parse_url_query, serialize_url_query, to_query_string};
    pub use resquery_core::{ContextGuard, QueryPlan, ResourceField, Row};
}
