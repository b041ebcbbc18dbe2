//! Aggregation of the active-record predicate, the context filter and the
//! explicit filters of a resource into one query and one join plan.

use super::access::AccessPolicy;
use crate::error::Result;
use crate::expr::{self, Predicate};
use crate::field::Scope;
use crate::filter::Filter;
use crate::join::{InnerJoins, LeftJoin, LeftJoins};
use crate::schema::{ComponentDef, TableRef};
use crate::selector::context_name;
use crate::url::{self, BBOX_KEY, BoundingBox, LOCATION_FIELD, UrlVars};
use crate::value::Value;
use std::cell::OnceCell;
use std::sync::Arc;

/// What a component resource takes over from its master.
#[derive(Clone, Debug)]
pub(crate) struct Inherited<'s> {
    pub(crate) master: Scope<'s>,
    pub(crate) component: ComponentDef,
    pub(crate) query: Predicate,
    pub(crate) filters: Vec<Filter>,
    pub(crate) implicit: Vec<TableRef>,
}

#[derive(Clone, Debug)]
struct FilterEntry {
    filter: Filter,
    inner: bool,
}

#[derive(Clone, Debug)]
struct Compiled {
    query: Predicate,
    inner: InnerJoins,
    /// Left-join form of the inner joins, carrying the joined tables
    inner_chain: LeftJoins,
    left: LeftJoins,
    distinct: bool,
    virtual_filter: Option<Filter>,
    /// Tables the query joins in its condition
    implicit: Vec<TableRef>,
}

/// The filters of one resource. The compiled query and joins are cached and
/// recomputed after every change.
#[derive(Clone, Debug)]
pub struct ResourceFilter<'s> {
    scope: Scope<'s>,
    inherited: Option<Inherited<'s>>,
    access: Arc<dyn AccessPolicy>,
    ids: Vec<Value>,
    uids: Vec<Value>,
    context: Option<Arc<Filter>>,
    filters: Vec<FilterEntry>,
    bbox: Option<BoundingBox>,
    cache: OnceCell<Compiled>,
}

impl<'s> ResourceFilter<'s> {
    pub(crate) fn new(scope: Scope<'s>, access: Arc<dyn AccessPolicy>) -> Self {
        Self {
            scope,
            inherited: None,
            access,
            ids: Vec::new(),
            uids: Vec::new(),
            context: None,
            filters: Vec::new(),
            bbox: None,
            cache: OnceCell::new(),
        }
    }

    pub(crate) fn set_inherited(&mut self, inherited: Inherited<'s>) {
        self.inherited = Some(inherited);
        self.cache = OnceCell::new();
    }

    pub(crate) fn set_access(&mut self, access: Arc<dyn AccessPolicy>) {
        self.access = access;
        self.cache = OnceCell::new();
    }

    pub(crate) fn set_ids(&mut self, ids: Vec<Value>) {
        self.ids = ids;
        self.cache = OnceCell::new();
    }

    pub(crate) fn set_uids(&mut self, uids: Vec<Value>) {
        self.uids = uids;
        self.cache = OnceCell::new();
    }

    pub(crate) fn set_context(&mut self, context: Option<Arc<Filter>>) {
        self.context = context;
        self.cache = OnceCell::new();
    }

    /// Sets the bounding box, if this table is located.
    pub(crate) fn set_bbox(&mut self, bbox: BoundingBox) -> bool {
        if self.location_table().is_none() {
            return false;
        }
        self.bbox = Some(bbox);
        self.cache = OnceCell::new();
        true
    }

    pub(crate) fn access(&self) -> &Arc<dyn AccessPolicy> {
        &self.access
    }

    pub fn scope(&self) -> &Scope<'s> {
        &self.scope
    }

    /// Adds a filter whose joins become left joins.
    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(FilterEntry {
            filter,
            inner: false,
        });
        self.cache = OnceCell::new();
    }

    /// Adds a filter whose joins become inner joins.
    pub fn add_inner_filter(&mut self, filter: Filter) {
        self.filters.push(FilterEntry {
            filter,
            inner: true,
        });
        self.cache = OnceCell::new();
    }

    /// Explicit filters in the order they were added.
    pub fn filters(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter().map(|entry| &entry.filter)
    }

    /// The context filter, if set and applicable to this table. It applies
    /// only when the table declares every context its selectors name.
    pub fn context(&self) -> Option<&Filter> {
        let context = self.context.as_deref()?;
        let table = self.scope.table_def().ok()?;
        let applies = context
            .selectors()
            .iter()
            .filter_map(|s| context_name(s.name()))
            .all(|name| table.context_selector(name).is_some());
        if !applies {
            resq_debug!(table = table.name(), "resquery.context.ignored");
            return None;
        }
        Some(context)
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    /// Table referenced by the location field, if the table has one.
    pub fn location_table(&self) -> Option<TableRef> {
        let table = self.scope.table_def().ok()?;
        let location = table.get_field(LOCATION_FIELD)?.ftype.referenced_table()?;
        Some(TableRef::new(location))
    }

    /// Context filter followed by the explicit filters.
    pub(crate) fn active_filters(&self) -> Vec<Filter> {
        self.context()
            .cloned()
            .into_iter()
            .chain(self.filters().cloned())
            .collect()
    }

    /// Active-record predicate restricted to the record ids and uuids.
    pub fn master_query(&self) -> Predicate {
        let table = self.scope.table();
        let mut query = self.access.accessible(table);
        for (field, values) in [("id", &self.ids), ("uuid", &self.uids)] {
            let column = table.column(field);
            match values.as_slice() {
                [] => {}
                [value] => query = query & Predicate::eq(column, value.clone()),
                values => query = query & Predicate::belongs(column, values.iter().cloned()),
            }
        }
        query
    }

    fn compiled(&self) -> Result<&Compiled> {
        if let Some(compiled) = self.cache.get() {
            return Ok(compiled);
        }
        let compiled = self.compile()?;
        Ok(self.cache.get_or_init(|| compiled))
    }

    fn compile(&self) -> Result<Compiled> {
        let mut compiled = Compiled {
            query: self.master_query(),
            inner: InnerJoins::new(),
            inner_chain: LeftJoins::new(),
            left: LeftJoins::new(),
            distinct: false,
            virtual_filter: None,
            implicit: Vec::new(),
        };

        if let Some(inherited) = &self.inherited {
            compiled.query = compiled.query & inherited.query.clone();
            compiled.implicit.clone_from(&inherited.implicit);
            let mut parent_left = LeftJoins::new();
            for filter in &inherited.filters {
                if let (Some(db), _) = filter.split(&inherited.master)? {
                    parent_left.merge(db.joins(&inherited.master)?.left);
                }
            }
            parent_left.remove(self.scope.table().alias());
            if !parent_left.is_empty() {
                let master = inherited.master.table();
                compiled
                    .left
                    .extend(master.alias(), inherited.component.reverse_left_join(master));
                compiled.left.merge(parent_left);
                compiled.distinct = true;
            }
        }

        let context = self.context().map(|filter| (filter, false));
        let explicit = self.filters.iter().map(|e| (&e.filter, e.inner));
        let mut terms = Vec::new();
        let mut virtual_terms = Vec::new();
        for (filter, inner) in context.into_iter().chain(explicit) {
            let (db, virtual_part) = filter.split(&self.scope)?;
            if let Some(db) = db {
                terms.push(db.query(&self.scope)?);
                let joins = db.joins(&self.scope)?;
                if inner {
                    compiled.inner.merge(joins.inner);
                    compiled.inner_chain.merge(joins.left);
                } else {
                    compiled.left.merge(joins.left);
                }
                compiled.distinct |= joins.distinct;
            }
            virtual_terms.extend(virtual_part);
        }
        if let Some((bbox, location)) = self.bbox.zip(self.location_table()) {
            terms.push(bbox.query(self.scope.table(), &location));
            if !compiled.implicit.contains(&location) {
                compiled.implicit.push(location);
            }
        }

        if let Some(own) = expr::and(terms) {
            compiled.query = compiled.query & own;
        }
        if let Some(inherited) = &self.inherited {
            compiled.query = compiled.query & inherited.component.join(inherited.master.table());
        }
        compiled.virtual_filter = Filter::all(virtual_terms);

        resq_trace_filter!(
            self.scope.table(),
            compiled.left.value_count(),
            compiled.distinct
        );
        Ok(compiled)
    }

    /// `mquery & (context & filter1 & filter2 ...)`, for components also
    /// conjoined with the master query and the component join.
    pub fn effective_query(&self) -> Result<Predicate> {
        Ok(self.compiled()?.query.clone())
    }

    /// Inner join conditions per table and the flattened left join list.
    pub fn effective_joins(&self) -> Result<(InnerJoins, Vec<LeftJoin>)> {
        let compiled = self.compiled()?;
        Ok((compiled.inner.clone(), compiled.left.as_list()))
    }

    pub fn inner_joins(&self) -> Result<InnerJoins> {
        Ok(self.compiled()?.inner.clone())
    }

    /// Inner joins as a table chain, for rendering.
    pub(crate) fn inner_join_list(&self) -> Result<Vec<LeftJoin>> {
        Ok(self.compiled()?.inner_chain.as_list())
    }

    /// Left joins per table, every contribution kept.
    pub fn left_joins(&self) -> Result<LeftJoins> {
        Ok(self.compiled()?.left.clone())
    }

    /// Left joins flattened in plan order, exact duplicates dropped.
    pub fn left_join_list(&self) -> Result<Vec<LeftJoin>> {
        Ok(self.compiled()?.left.as_list())
    }

    /// Whether the joins may multiply rows of the base table.
    pub fn distinct(&self) -> Result<bool> {
        Ok(self.compiled()?.distinct)
    }

    /// Tables joined through the query condition instead of a join.
    pub fn implicit_tables(&self) -> Result<Vec<TableRef>> {
        Ok(self.compiled()?.implicit.clone())
    }

    /// Conjuncts on virtual fields, evaluated on loaded rows.
    pub fn virtual_filter(&self) -> Result<Option<Filter>> {
        Ok(self.compiled()?.virtual_filter.clone())
    }

    /// URL query vars for the explicit filters and the bounding box.
    pub fn serialize_url(&self) -> UrlVars {
        let mut vars = UrlVars::new();
        for filter in self.filters() {
            vars.merge(url::serialize(filter, true));
        }
        if let Some(bbox) = &self.bbox {
            vars.append(BBOX_KEY, bbox.to_string());
        }
        vars
    }
}
