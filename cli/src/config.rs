//! Configuration for the resquery CLI
//!
//! Loads a schema description from `resquery.toml`:
//!
//! ```toml
//! [[table]]
//! name = "org_organisation"
//! fields = { name = "string", acronym = "string" }
//! super_links = { pe_id = "pr_pentity" }
//!
//! [[table]]
//! name = "org_office"
//! fields = { name = "string", organisation_id = "reference org_organisation" }
//! contexts = { organisation = "organisation_id" }
//!
//! [[component]]
//! master = "org_organisation"
//! table = "org_office"
//! fkey = "organisation_id"
//! ```

use resquery::Value;
use resquery::error::QueryError;
use resquery::schema::{ComponentDef, FieldType, Schema, TableDef};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "resquery.toml";

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldType>,
    /// Super-entity key to super-entity table
    #[serde(default)]
    pub super_links: BTreeMap<String, String>,
    /// Context name to context selector
    #[serde(default)]
    pub contexts: BTreeMap<String, String>,
}

impl TableConfig {
    fn to_def(&self) -> TableDef {
        let mut def = TableDef::new(self.name.as_str());
        for (name, ftype) in &self.fields {
            def = def.field(name.as_str(), ftype.clone());
        }
        for (key, entity) in &self.super_links {
            def = def.super_link(key.as_str(), entity.as_str());
        }
        for (name, selector) in &self.contexts {
            def = def.context(name.as_str(), selector.as_str());
        }
        def
    }
}

// ============================================================================
// Components
// ============================================================================

/// A component registration. Exactly one of `fkey`, `super_key` or `link`
/// selects the linkage.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub master: String,
    pub table: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub fkey: Option<String>,
    #[serde(default)]
    pub super_key: Option<String>,
    #[serde(default)]
    pub link: Option<LinkConfig>,
    #[serde(default)]
    pub pkey: Option<String>,
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    #[serde(default)]
    pub single: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkConfig {
    pub table: String,
    pub lkey: String,
    pub rkey: String,
    #[serde(default)]
    pub fkey: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    pub field: String,
    pub values: Vec<FilterValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl From<&FilterValue> for Value {
    fn from(v: &FilterValue) -> Self {
        match v {
            FilterValue::Int(i) => Value::Int(*i),
            FilterValue::Float(f) => Value::Float(*f),
            FilterValue::Bool(b) => Value::Bool(*b),
            FilterValue::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl ComponentConfig {
    fn label(&self) -> String {
        format!("{} -> {}", self.master, self.table)
    }

    fn to_def(&self) -> Result<ComponentDef, Error> {
        let master = self.master.as_str();
        let table = self.table.as_str();
        let mut def = match (&self.fkey, &self.super_key, &self.link) {
            (Some(fkey), None, None) => ComponentDef::plain(master, table, fkey.as_str()),
            (None, Some(key), None) => ComponentDef::super_entity(master, table, key.as_str()),
            (None, None, Some(link)) => {
                let def = ComponentDef::link(
                    master,
                    table,
                    link.table.as_str(),
                    link.lkey.as_str(),
                    link.rkey.as_str(),
                );
                match &link.fkey {
                    Some(fkey) => def.with_fkey(fkey.as_str()),
                    None => def,
                }
            }
            _ => return Err(Error::InvalidComponent(self.label())),
        };
        if let Some(alias) = &self.alias {
            def = def.with_alias(alias.as_str());
        }
        if let Some(pkey) = &self.pkey {
            def = def.with_pkey(pkey.as_str());
        }
        if let Some(filter) = &self.filter {
            def = def.filter_by(filter.field.as_str(), filter.values.iter().map(Value::from));
        }
        if self.single {
            def = def.single();
        }
        Ok(def)
    }
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, rename = "table")]
    pub tables: Vec<TableConfig>,
    #[serde(default, rename = "component")]
    pub components: Vec<ComponentConfig>,
}

impl Config {
    /// Load from default config file
    pub fn load() -> Result<Self, Error> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from specific path
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.into())
            } else {
                Error::Io(path.into(), e)
            }
        })?;

        toml::from_str(&content).map_err(|e| Error::Parse(path.into(), e))
    }

    /// Builds and validates the schema.
    pub fn schema(&self) -> Result<Schema, Error> {
        let mut builder = Schema::builder();
        for table in &self.tables {
            builder = builder.table(table.to_def());
        }
        for component in &self.components {
            builder = builder.component(component.to_def()?);
        }
        Ok(builder.build()?)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("component {0} needs exactly one of `fkey`, `super_key` or `link`")]
    InvalidComponent(String),

    #[error("invalid schema: {0}")]
    Schema(#[from] QueryError),
}

pub type ConfigError = Error;

// ============================================================================
// Tests
// ============================================================================
