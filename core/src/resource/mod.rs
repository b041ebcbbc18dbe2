//! Resources: a table queried as a whole, with its filters, its components
//! and the plan to fetch it.

mod access;
mod filter;

pub use access::{AccessPolicy, ActiveRecords, OwnedBy};
pub use filter::ResourceFilter;

use crate::context::global_context;
use crate::error::{QueryError, Result};
use crate::expr::Predicate;
use crate::field::{ResourceField, Scope};
use crate::filter::{Filter, Joins};
use crate::join::{Join, LeftJoin};
use crate::plan::QueryPlan;
use crate::rows::{Row, collapse_rows, count_distinct};
use crate::schema::{ComponentDef, Schema, TableRef};
use crate::url::{self, BoundingBox, UrlVars};
use crate::value::Value;
use compact_str::CompactString;
use filter::Inherited;
use smallvec::SmallVec;
use std::sync::Arc;

/// List fields resolved against a resource, with their merged joins.
#[derive(Clone, Debug, Default)]
pub struct ResolvedSelectors {
    pub fields: Vec<ResourceField>,
    pub joins: Joins,
}

#[derive(Clone, Debug)]
pub struct Resource<'s> {
    rfilter: ResourceFilter<'s>,
    component: Option<ComponentDef>,
    master: Option<TableRef>,
}

impl<'s> Resource<'s> {
    pub fn new(schema: &'s Schema, tablename: &str) -> Result<Self> {
        let scope = Scope::new(schema, tablename)?;
        Ok(Self {
            rfilter: ResourceFilter::new(scope, Arc::new(ActiveRecords)),
            component: None,
            master: None,
        })
    }

    pub fn with_access(mut self, policy: impl AccessPolicy + 'static) -> Self {
        self.rfilter.set_access(Arc::new(policy));
        self
    }

    /// Restricts the resource to records with these ids.
    pub fn with_ids<I, V>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rfilter.set_ids(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the resource to records with these uuids.
    pub fn with_uids<I, V>(mut self, uids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rfilter.set_uids(uids.into_iter().map(Into::into).collect());
        self
    }

    /// Applies the global context filter, as it is at this moment.
    pub fn with_context(mut self) -> Self {
        self.rfilter.set_context(global_context());
        self
    }

    /// Applies `filter` as context filter instead of the global one.
    pub fn with_context_filter(mut self, filter: Filter) -> Self {
        self.rfilter.set_context(Some(Arc::new(filter)));
        self
    }

    /// Adds the filters of a URL query. Filters for components this
    /// resource does not have are skipped, and so is a bounding box unless
    /// the table is located.
    pub fn with_url_vars(mut self, vars: &UrlVars) -> Self {
        if let Some(bbox) = BoundingBox::from_vars(vars)
            && !self.rfilter.set_bbox(bbox)
        {
            resq_debug!(table = self.tablename(), "resquery.url.bbox_ignored");
        }
        let parsed = url::parse(vars, self.alias());
        for (alias, filters) in parsed.iter() {
            if alias != self.alias() && self.schema().component(self.tablename(), alias).is_none() {
                resq_warn!(alias, table = self.tablename(), "resquery.url.unknown_component");
                continue;
            }
            for filter in filters {
                self.rfilter.add_filter(filter.clone());
            }
        }
        self
    }

    pub fn schema(&self) -> &'s Schema {
        self.rfilter.scope().schema()
    }

    pub fn scope(&self) -> &Scope<'s> {
        self.rfilter.scope()
    }

    pub fn table(&self) -> &TableRef {
        self.scope().table()
    }

    pub fn tablename(&self) -> &str {
        self.table().name()
    }

    pub fn alias(&self) -> &str {
        self.scope().alias()
    }

    pub fn rfilter(&self) -> &ResourceFilter<'s> {
        &self.rfilter
    }

    pub fn resolve(&self, selector: &str) -> Result<ResourceField> {
        self.scope().resolve(selector)
    }

    /// Resolves list fields and merges their joins. Selectors that cannot be
    /// resolved are skipped, and so are component fields when
    /// `skip_components` is set.
    pub fn resolve_selectors(
        &self,
        selectors: &[&str],
        skip_components: bool,
    ) -> Result<ResolvedSelectors> {
        let mut resolved = ResolvedSelectors::default();
        for selector in selectors {
            let rfield = match self.resolve(selector) {
                Ok(rfield) => rfield,
                Err(QueryError::UnresolvableSelector { .. }) => {
                    resq_warn!(selector, table = self.tablename(), "resquery.selector.skipped");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if skip_components && rfield.via_component() {
                continue;
            }
            if resolved.fields.iter().any(|f| f.colname() == rfield.colname()) {
                continue;
            }
            resolved.joins.inner.merge(rfield.join().clone());
            resolved.joins.left.merge(rfield.left().clone());
            resolved.joins.distinct |= rfield.distinct();
            resolved.fields.push(rfield);
        }
        Ok(resolved)
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.rfilter.add_filter(filter);
    }

    pub fn add_inner_filter(&mut self, filter: Filter) {
        self.rfilter.add_inner_filter(filter);
    }

    /// Effective query of the resource.
    pub fn get_query(&self) -> Result<Predicate> {
        self.rfilter.effective_query()
    }

    /// The component registered under `alias`, as a resource of its own.
    /// It inherits the query and filters of this resource.
    pub fn component(&self, alias: &str) -> Result<Resource<'s>> {
        let schema = self.schema();
        let def = schema
            .component(self.tablename(), alias)
            .ok_or_else(|| QueryError::UnknownComponent {
                table: self.tablename().into(),
                alias: CompactString::from(alias),
            })?;
        let scope = Scope::component(schema, def)?;
        let mut rfilter = ResourceFilter::new(scope, Arc::clone(self.rfilter.access()));
        rfilter.set_inherited(Inherited {
            master: self.scope().clone(),
            component: def.clone(),
            query: self.get_query()?,
            filters: self.rfilter.active_filters(),
            implicit: self.rfilter.implicit_tables()?,
        });
        Ok(Resource {
            rfilter,
            component: Some(def.clone()),
            master: Some(self.table().clone()),
        })
    }

    /// Registration of a component resource.
    pub fn component_def(&self) -> Option<&ComponentDef> {
        self.component.as_ref()
    }

    /// Inner join condition from the master, for component resources.
    pub fn get_join(&self) -> Option<Predicate> {
        let (def, master) = self.component.as_ref().zip(self.master.as_ref())?;
        Some(def.join(master))
    }

    /// Left join chain from the master, for component resources.
    pub fn get_left_join(&self) -> Option<SmallVec<[LeftJoin; 2]>> {
        let (def, master) = self.component.as_ref().zip(self.master.as_ref())?;
        Some(def.left_join(master))
    }

    /// Plan to select `fields` under the filters of this resource.
    pub fn plan(&self, fields: &[&str]) -> Result<QueryPlan> {
        let resolved = self.resolve_selectors(fields, false)?;
        let mut left = self.rfilter.left_joins()?;
        left.merge(resolved.joins.left);
        let left = left.as_list();

        let implicit = self
            .master
            .iter()
            .cloned()
            .chain(self.rfilter.implicit_tables()?)
            .filter(|table| !left.iter().any(|j| j.table.alias() == table.alias()))
            .collect();

        let joins = self
            .rfilter
            .inner_join_list()?
            .into_iter()
            .map(|j| Join::inner(j.table, j.on))
            .chain(left.into_iter().map(LeftJoin::into_join))
            .collect();

        Ok(QueryPlan {
            distinct: self.rfilter.distinct()? || resolved.joins.distinct,
            columns: resolved
                .fields
                .iter()
                .filter(|f| !f.is_virtual())
                .map(|f| CompactString::from(f.colname()))
                .collect(),
            table: self.table().clone(),
            implicit,
            joins,
            condition: self.get_query()?,
        })
    }

    /// Post-processes rows fetched with [`Resource::plan`]: applies the
    /// conditions on virtual fields, then collapses rows multiplied by
    /// component joins into one row per record.
    pub fn load(&self, mut rows: Vec<Row>, fields: &[&str]) -> Result<Vec<Row>> {
        self.filter_virtual(&mut rows)?;
        let resolved = self.resolve_selectors(fields, false)?;
        if !(self.rfilter.distinct()? || resolved.joins.distinct) {
            return Ok(rows);
        }
        let list_columns: Vec<&str> = resolved
            .fields
            .iter()
            .filter(|f| f.multiple())
            .map(ResourceField::colname)
            .collect();
        Ok(collapse_rows(rows, &self.table().colname("id"), &list_columns))
    }

    /// Number of distinct records among fetched rows.
    pub fn count(&self, mut rows: Vec<Row>) -> Result<usize> {
        self.filter_virtual(&mut rows)?;
        Ok(count_distinct(&rows, &self.table().colname("id")))
    }

    fn filter_virtual(&self, rows: &mut Vec<Row>) -> Result<()> {
        let Some(vfilter) = self.rfilter.virtual_filter()? else {
            return Ok(());
        };
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows.drain(..) {
            if vfilter.evaluate(self.scope(), &row)? {
                kept.push(row);
            }
        }
        *rows = kept;
        Ok(())
    }

    /// URL query vars reproducing the explicit filters.
    pub fn serialize_url(&self) -> UrlVars {
        self.rfilter.serialize_url()
    }
}
