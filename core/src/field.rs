//! Resolution of selectors into concrete columns and join plans.

use crate::error::{QueryError, Result};
use crate::expr::{Column, Predicate};
use crate::join::{InnerJoins, LeftJoin, LeftJoins};
use crate::schema::{ComponentDef, FieldType, Schema, TableDef, TableRef};
use crate::selector::{Hop, Prefix, Selector};
use compact_str::{CompactString, format_compact};

/// Context expansions may refer to other contexts, up to this depth.
const MAX_CONTEXT_DEPTH: usize = 4;

/// What selectors are resolved against: a schema and a base table, together
/// with the alias the base table is known under as a resource.
#[derive(Clone, Debug)]
pub struct Scope<'s> {
    schema: &'s Schema,
    table: TableRef,
    alias: CompactString,
}

impl<'s> Scope<'s> {
    /// Scope of a master resource on `tablename`.
    pub fn new(schema: &'s Schema, tablename: &str) -> Result<Self> {
        let def = schema.require_table(tablename)?;
        Ok(Self {
            schema,
            table: TableRef::new(tablename),
            alias: def.default_alias().into(),
        })
    }

    /// Scope of a component resource.
    pub fn component(schema: &'s Schema, component: &ComponentDef) -> Result<Self> {
        schema.require_table(component.tablename())?;
        Ok(Self {
            schema,
            table: component.table(),
            alias: component.alias().into(),
        })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Resource alias, as used for `alias.` prefixes in selectors and URLs.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn table_def(&self) -> Result<&'s TableDef> {
        self.schema.require_table(self.table.name())
    }

    /// Resolves `selector` against this scope.
    pub fn resolve(&self, selector: &str) -> Result<ResourceField> {
        let mut rfield = self.resolve_path(selector, selector, 0)?;
        rfield.selector = selector.into();
        resq_trace_resolve!(selector, rfield.colname, rfield.left.value_count());
        Ok(rfield)
    }

    fn resolve_path(&self, original: &str, selector: &str, depth: usize) -> Result<ResourceField> {
        let path = Selector::parse(selector)?;
        let table_def = self.table_def()?;

        if let Prefix::Context { name, rest } = path.prefix {
            if depth >= MAX_CONTEXT_DEPTH {
                return Err(QueryError::unresolvable(original, "context expansion too deep"));
            }
            let expansion = table_def.context_selector(name).ok_or_else(|| {
                QueryError::unresolvable(
                    original,
                    format_compact!("no context `{name}` on {}", table_def.name()),
                )
            })?;
            let expanded = format_compact!("{expansion}{rest}");
            return self.resolve_path(original, &expanded, depth + 1);
        }

        let mut hops = path.hops.as_slice();
        if path.prefix == Prefix::None
            && let [Hop::Component(alias), rest @ ..] = hops
            && *alias == self.alias
        {
            hops = rest;
        }

        let mut current = self.table.clone();
        let mut current_def = table_def;
        let mut join = InnerJoins::new();
        let mut left = LeftJoins::new();
        let mut via_component = false;
        let mut multiple = false;

        for (i, hop) in hops.iter().enumerate() {
            match *hop {
                Hop::Reference(fkey) => {
                    let fdef = current_def.get_field(fkey).ok_or_else(|| {
                        QueryError::unresolvable(
                            original,
                            format_compact!("{} has no field {fkey}", current_def.name()),
                        )
                    })?;
                    let target = fdef.ftype.referenced_table().ok_or_else(|| {
                        QueryError::unresolvable(
                            original,
                            format_compact!("{fkey} is not a foreign key"),
                        )
                    })?;
                    let target_def = self.schema.require_table(target)?;
                    let target = TableRef::new(target);
                    let on = Predicate::eq(current.column(fkey), target.column("id"));
                    join.append(target.alias(), on.clone());
                    left.append(target.alias(), LeftJoin::new(target.clone(), on));
                    current = target;
                    current_def = target_def;
                }
                Hop::Component(alias) => {
                    let Some(component) = self.schema.component(current_def.name(), alias) else {
                        let reason = if current_def.has_field(alias) {
                            format_compact!(
                                "{alias} is a field of {}, dereference it with `$`",
                                current_def.name()
                            )
                        } else {
                            format_compact!("{} has no component {alias}", current_def.name())
                        };
                        return Err(QueryError::unresolvable(original, reason));
                    };
                    (current, current_def) =
                        self.hop_component(component, &current, &mut join, &mut left)?;
                    via_component |= i == 0;
                    multiple |= component.multiple();
                }
                Hop::Join { fkey, table } => {
                    let target_def = self.schema.require_table(table)?;
                    if !target_def.has_field(fkey) {
                        return Err(QueryError::unresolvable(
                            original,
                            format_compact!("{table} has no field {fkey}"),
                        ));
                    }
                    let component = ComponentDef::plain(current_def.name(), table, fkey);
                    (current, current_def) =
                        self.hop_component(&component, &current, &mut join, &mut left)?;
                    via_component |= i == 0;
                    multiple = true;
                }
            }
        }

        let (field, ftype) = if let Some(fdef) = current_def.get_field(path.field) {
            (Some(fdef.name.clone()), fdef.ftype.clone())
        } else if current_def.is_virtual(path.field) {
            (None, FieldType::Virtual)
        } else {
            return Err(QueryError::unresolvable(
                original,
                format_compact!("{} has no field {}", current_def.name(), path.field),
            ));
        };

        let distinct = !join.is_empty() || !left.is_empty();
        Ok(ResourceField {
            selector: CompactString::default(),
            colname: current.colname(path.field),
            fname: path.field.into(),
            table: current,
            field,
            ftype,
            join,
            left,
            distinct,
            via_component,
            multiple,
        })
    }

    fn hop_component(
        &self,
        component: &ComponentDef,
        from: &TableRef,
        join: &mut InnerJoins,
        left: &mut LeftJoins,
    ) -> Result<(TableRef, &'s TableDef)> {
        let target_def = self.schema.require_table(component.tablename())?;
        let target = component.table();
        join.append(target.alias(), component.join(from));
        left.extend(target.alias(), component.left_join(from));
        Ok((target, target_def))
    }
}

/// A selector resolved to a column of a concrete (possibly aliased) table,
/// with the joins that make that table reachable from the base table.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceField {
    pub(crate) selector: CompactString,
    pub(crate) table: TableRef,
    pub(crate) field: Option<CompactString>,
    pub(crate) fname: CompactString,
    pub(crate) colname: CompactString,
    pub(crate) ftype: FieldType,
    pub(crate) join: InnerJoins,
    pub(crate) left: LeftJoins,
    pub(crate) distinct: bool,
    pub(crate) via_component: bool,
    pub(crate) multiple: bool,
}

impl ResourceField {
    /// The selector as written by the caller.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Alias of the table holding the field.
    pub fn tname(&self) -> &str {
        self.table.alias()
    }

    /// Field name in the table, `None` for virtual fields.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn fname(&self) -> &str {
        &self.fname
    }

    /// `tname.fname`
    pub fn colname(&self) -> &str {
        &self.colname
    }

    pub fn ftype(&self) -> &FieldType {
        &self.ftype
    }

    pub fn is_virtual(&self) -> bool {
        self.field.is_none()
    }

    pub fn column(&self) -> Column {
        self.table.column(&self.fname)
    }

    /// Inner join conditions per target table.
    pub fn join(&self) -> &InnerJoins {
        &self.join
    }

    /// Left join chains per target table.
    pub fn left(&self) -> &LeftJoins {
        &self.left
    }

    /// Whether reaching the field may multiply result rows.
    pub fn distinct(&self) -> bool {
        self.distinct
    }

    /// Whether the path starts with a component of the base table.
    pub fn via_component(&self) -> bool {
        self.via_component
    }

    /// Whether the path passes a component with several records per master
    /// record, so one base record may carry several values.
    pub fn multiple(&self) -> bool {
        self.multiple
    }
}
