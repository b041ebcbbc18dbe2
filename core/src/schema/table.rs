use crate::expr::Column;
use compact_str::{CompactString, format_compact};
use smallvec::SmallVec;
use std::fmt;

/// Fields every table carries.
pub const META_FIELDS: [(&str, FieldType); 3] = [
    ("id", FieldType::Id),
    ("uuid", FieldType::String),
    ("deleted", FieldType::Boolean),
];

/// Storage type of a field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum FieldType {
    Id,
    Integer,
    Double,
    Boolean,
    String,
    Text,
    Date,
    DateTime,
    Json,
    /// Foreign key to the named table
    Reference(CompactString),
    /// Pipe-separated list of keys into the named table
    ListReference(CompactString),
    ListInteger,
    ListString,
    /// Computed outside the store, no column
    Virtual,
}

impl FieldType {
    /// Parses the textual form used in configuration files.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(table) = s.strip_prefix("reference ") {
            return Some(FieldType::Reference(table.trim().into()));
        }
        if let Some(table) = s.strip_prefix("list:reference ") {
            return Some(FieldType::ListReference(table.trim().into()));
        }
        Some(match s {
            "id" => FieldType::Id,
            "integer" => FieldType::Integer,
            "double" => FieldType::Double,
            "boolean" => FieldType::Boolean,
            "string" => FieldType::String,
            "text" => FieldType::Text,
            "date" => FieldType::Date,
            "datetime" => FieldType::DateTime,
            "json" => FieldType::Json,
            "list:integer" => FieldType::ListInteger,
            "list:string" => FieldType::ListString,
            "virtual" => FieldType::Virtual,
            _ => return None,
        })
    }

    /// Text-like columns, where case transforms and substring matching apply.
    pub const fn is_text(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Text)
    }

    pub const fn is_list(&self) -> bool {
        matches!(
            self,
            FieldType::ListReference(_) | FieldType::ListInteger | FieldType::ListString
        )
    }

    /// Table a single-valued reference points to.
    pub fn referenced_table(&self) -> Option<&str> {
        match self {
            FieldType::Reference(table) => Some(table),
            _ => None,
        }
    }

    /// Type of the items of a list type, the type itself otherwise.
    pub fn element_type(&self) -> FieldType {
        match self {
            FieldType::ListReference(_) | FieldType::ListInteger => FieldType::Integer,
            FieldType::ListString => FieldType::String,
            other => other.clone(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Id => "id",
            FieldType::Integer => "integer",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Json => "json",
            FieldType::Reference(table) => return write!(f, "reference {table}"),
            FieldType::ListReference(table) => return write!(f, "list:reference {table}"),
            FieldType::ListInteger => "list:integer",
            FieldType::ListString => "list:string",
            FieldType::Virtual => "virtual",
        };
        f.write_str(name)
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FieldType::parse(&s).ok_or_else(|| format!("unknown field type `{s}`"))
    }
}

impl From<FieldType> for String {
    fn from(ftype: FieldType) -> Self {
        ftype.to_string()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: CompactString,
    pub ftype: FieldType,
}

/// A table of the schema: its fields, super-entity keys, virtual fields and
/// named context selectors.
#[derive(Clone, Debug, PartialEq)]
pub struct TableDef {
    pub(crate) name: CompactString,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) super_keys: SmallVec<[(CompactString, CompactString); 1]>,
    pub(crate) virtual_fields: SmallVec<[CompactString; 2]>,
    pub(crate) contexts: SmallVec<[(CompactString, CompactString); 2]>,
}

impl TableDef {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            fields: META_FIELDS
                .iter()
                .map(|(name, ftype)| FieldDef {
                    name: (*name).into(),
                    ftype: ftype.clone(),
                })
                .collect(),
            super_keys: SmallVec::new(),
            virtual_fields: SmallVec::new(),
            contexts: SmallVec::new(),
        }
    }

    /// Adds or redefines a field.
    pub fn field(mut self, name: impl Into<CompactString>, ftype: FieldType) -> Self {
        let name = name.into();
        if ftype == FieldType::Virtual {
            return self.virtual_field(name);
        }
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.ftype = ftype,
            None => self.fields.push(FieldDef { name, ftype }),
        }
        self
    }

    /// Declares `key` as the link to the super-entity table `entity`.
    pub fn super_link(
        mut self,
        key: impl Into<CompactString>,
        entity: impl Into<CompactString>,
    ) -> Self {
        let key = key.into();
        self = self.field(key.clone(), FieldType::Integer);
        self.super_keys.push((key, entity.into()));
        self
    }

    pub fn virtual_field(mut self, name: impl Into<CompactString>) -> Self {
        self.virtual_fields.push(name.into());
        self
    }

    /// Registers a named context, e.g. `organisation` to `organisation_id`,
    /// usable in selectors as `(organisation)`.
    pub fn context(
        mut self,
        name: impl Into<CompactString>,
        selector: impl Into<CompactString>,
    ) -> Self {
        self.contexts.push((name.into(), selector.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    pub fn is_virtual(&self, name: &str) -> bool {
        self.virtual_fields.iter().any(|v| v == name)
    }

    pub fn super_keys(&self) -> impl Iterator<Item = (&str, &str)> {
        self.super_keys.iter().map(|(k, e)| (k.as_str(), e.as_str()))
    }

    pub fn is_super_key(&self, name: &str) -> bool {
        self.super_keys.iter().any(|(k, _)| k == name)
    }

    pub fn context_selector(&self, name: &str) -> Option<&str> {
        self.contexts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.as_str())
    }

    pub fn contexts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.contexts.iter().map(|(n, s)| (n.as_str(), s.as_str()))
    }

    /// Resource alias of this table when used as a master.
    pub fn default_alias(&self) -> &str {
        default_alias(&self.name)
    }
}

/// Table name without its module prefix: `project_project` is `project`,
/// `org_office` is `office`.
pub fn default_alias(tablename: &str) -> &str {
    tablename
        .split_once('_')
        .map(|(_, rest)| rest)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(tablename)
}

/// A table as it appears in a query: the physical table and the name it is
/// joined under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableRef {
    name: CompactString,
    alias: CompactString,
}

impl TableRef {
    pub fn new(name: impl Into<CompactString>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
        }
    }

    pub fn aliased(name: impl Into<CompactString>, alias: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }

    /// Physical table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the table is referred to by in the query.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn is_aliased(&self) -> bool {
        self.name != self.alias
    }

    pub fn column(&self, field: &str) -> Column {
        Column::new(self.alias.clone(), field)
    }

    /// `alias.field`
    pub fn colname(&self, field: &str) -> CompactString {
        format_compact!("{}.{}", self.alias, field)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_aliased() {
            write!(f, "{} AS {}", self.name, self.alias)
        } else {
            f.write_str(&self.name)
        }
    }
}
