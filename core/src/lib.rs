//! Selector resolution, join planning and filter composition.
//!
//! Callers address data through *field selectors* such as
//! `organisation_id$name`, `task.description` or `(organisation)$name`.
//! A [`Scope`] resolves selectors against a [`Schema`] into columns and the
//! joins that reach them, a [`Filter`] compiles into a [`Predicate`], and a
//! [`Resource`] combines its filters, components and access rules into a
//! [`QueryPlan`] for the storage engine.
//!
//! ```
//! use resquery_core::prelude::*;
//!
//! let schema = Schema::builder()
//!     .table(TableDef::new("org_organisation").field("name", FieldType::String))
//!     .table(
//!         TableDef::new("org_office")
//!             .field("name", FieldType::String)
//!             .field("organisation_id", FieldType::Reference("org_organisation".into())),
//!     )
//!     .build()?;
//!
//! let mut offices = Resource::new(&schema, "org_office")?;
//! offices.add_filter(field("organisation_id$name").lower().like("%red cross%"));
//!
//! let plan = offices.plan(&["name", "organisation_id$name"])?;
//! assert!(plan.distinct);
//! # Ok::<(), resquery_core::QueryError>(())
//! ```

#[macro_use]
mod trace;

pub mod axis;
pub mod context;
pub mod error;
pub mod expr;
pub mod field;
pub mod filter;
pub mod join;
pub mod multimap;
pub mod plan;
pub mod resource;
pub mod rows;
pub mod schema;
pub mod selector;
pub mod url;
pub mod value;

pub use axis::{AxisFilter, AxisValues};
pub use context::{ContextGuard, clear_global_context, global_context, set_global_context};
pub use error::{QueryError, Result};
pub use expr::{CmpOp, Column, Expr, Predicate, col};
pub use field::{ResourceField, Scope};
pub use filter::{Comparison, FieldSelector, Filter, Joins, Operand, Operator, Transform, field};
pub use join::{InnerJoins, Join, JoinType, LeftJoin, LeftJoins};
pub use multimap::OrderedMultiMap;
pub use plan::QueryPlan;
pub use resource::{
    AccessPolicy, ActiveRecords, OwnedBy, ResolvedSelectors, Resource, ResourceFilter,
};
pub use rows::{Row, collapse_rows, count_distinct};
pub use schema::{
    ComponentDef, ComponentFilter, FieldDef, FieldType, Linkage, Schema, SchemaBuilder, TableDef,
    TableRef,
};
pub use url::{UrlVars, parse_url, parse_url_query, serialize_url_query, to_query_string};
pub use value::Value;

pub mod prelude {
    pub use crate::axis::{AxisFilter, AxisValues};
    pub use crate::error::{QueryError, Result};
    pub use crate::expr::{Predicate, col};
    pub use crate::filter::{Filter, Operator, field};
    pub use crate::resource::Resource;
    pub use crate::schema::{ComponentDef, FieldType, Schema, TableDef, TableRef};
    pub use crate::url::{UrlVars, parse_url};
    pub use crate::value::Value;
}
