//! Schema description: tables, their fields and the component registry.
//!
//! A [`Schema`] is built once through [`SchemaBuilder`], which validates that
//! every component points at existing tables and keys and that no master has
//! two components under the same alias. After that it is read-only and can be
//! shared freely.

mod component;
mod table;

pub use component::{ComponentDef, ComponentFilter, Linkage};
pub use table::{FieldDef, FieldType, META_FIELDS, TableDef, TableRef, default_alias};

use crate::error::{QueryError, Result};
use compact_str::CompactString;
use hashbrown::HashMap;

#[derive(Clone, Debug, Default)]
pub struct Schema {
    tables: HashMap<CompactString, TableDef>,
    components: HashMap<CompactString, Vec<ComponentDef>>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn require_table(&self, name: &str) -> Result<&TableDef> {
        self.table(name)
            .ok_or_else(|| QueryError::UnknownTable(name.into()))
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    /// Component registered under `alias` on `master`.
    pub fn component(&self, master: &str, alias: &str) -> Option<&ComponentDef> {
        self.components(master).iter().find(|c| c.alias == alias)
    }

    /// All components of `master`, in registration order.
    pub fn components(&self, master: &str) -> &[ComponentDef] {
        self.components
            .get(master)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaBuilder {
    tables: Vec<TableDef>,
    components: Vec<ComponentDef>,
}

impl SchemaBuilder {
    pub fn table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    pub fn component(mut self, component: ComponentDef) -> Self {
        self.components.push(component);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut tables: HashMap<CompactString, TableDef> = HashMap::new();
        for table in self.tables {
            if tables.contains_key(&table.name) {
                return Err(QueryError::Schema(format!(
                    "table {} defined twice",
                    table.name
                )));
            }
            tables.insert(table.name.clone(), table);
        }

        let mut components: HashMap<CompactString, Vec<ComponentDef>> = HashMap::new();
        for component in self.components {
            validate_component(&tables, &component)?;
            let registered = components.entry(component.master.clone()).or_default();
            if registered.iter().any(|c| c.alias == component.alias) {
                return Err(QueryError::AmbiguousAlias {
                    table: component.master.clone(),
                    alias: component.alias.clone(),
                });
            }
            registered.push(component);
        }

        resq_debug!(
            tables = tables.len(),
            components = components.values().map(Vec::len).sum::<usize>(),
            "resquery.schema"
        );
        Ok(Schema { tables, components })
    }
}

fn validate_component(
    tables: &HashMap<CompactString, TableDef>,
    component: &ComponentDef,
) -> Result<()> {
    let lookup = |name: &str| {
        tables
            .get(name)
            .ok_or_else(|| QueryError::UnknownTable(name.into()))
    };
    let require = |table: &TableDef, field: &str| {
        if table.has_field(field) {
            Ok(())
        } else {
            Err(QueryError::Schema(format!(
                "component `{}` of {}: {} has no field {}",
                component.alias, component.master, table.name, field
            )))
        }
    };

    let master = lookup(&component.master)?;
    let table = lookup(&component.tablename)?;
    match &component.linkage {
        Linkage::Plain { pkey, fkey } => {
            require(master, pkey)?;
            require(table, fkey)?;
        }
        Linkage::Super { key } => {
            require(master, key)?;
            require(table, key)?;
        }
        Linkage::Link {
            link,
            pkey,
            lkey,
            rkey,
            fkey,
        } => {
            let link = lookup(link)?;
            require(master, pkey)?;
            require(link, lkey)?;
            require(link, rkey)?;
            require(table, fkey)?;
        }
    }
    if let Some(filter) = &component.filter {
        require(table, &filter.field)?;
    }
    Ok(())
}
