use super::table::{TableRef, default_alias};
use crate::expr::Predicate;
use crate::join::LeftJoin;
use crate::value::Value;
use compact_str::{CompactString, format_compact};
use smallvec::{SmallVec, smallvec};

/// How a component table is linked to its master.
#[derive(Clone, Debug, PartialEq)]
pub enum Linkage {
    /// `component.fkey = master.pkey`
    Plain {
        pkey: CompactString,
        fkey: CompactString,
    },
    /// Both tables share a super-entity key: `master.key = component.key`
    Super { key: CompactString },
    /// Through a link table: `link.lkey = master.pkey` and
    /// `link.rkey = component.fkey`
    Link {
        link: CompactString,
        pkey: CompactString,
        lkey: CompactString,
        rkey: CompactString,
        fkey: CompactString,
    },
}

/// Restricts a component to the rows where `field` is one of `values`.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentFilter {
    pub field: CompactString,
    pub values: SmallVec<[Value; 2]>,
}

impl ComponentFilter {
    /// Single value compiles to equality, several to membership, none to a
    /// predicate that is never true.
    pub fn predicate(&self, table: &TableRef) -> Predicate {
        let column = table.column(&self.field);
        match self.values.as_slice() {
            [] => Predicate::Const(false),
            [value] => Predicate::eq(column, value.clone()),
            values => Predicate::belongs(column, values.iter().cloned()),
        }
    }
}

/// A table attached to a master table under an alias.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentDef {
    pub(crate) master: CompactString,
    pub(crate) tablename: CompactString,
    pub(crate) alias: CompactString,
    pub(crate) linkage: Linkage,
    pub(crate) filter: Option<ComponentFilter>,
    pub(crate) multiple: bool,
}

impl ComponentDef {
    pub fn new(
        master: impl Into<CompactString>,
        tablename: impl Into<CompactString>,
        linkage: Linkage,
    ) -> Self {
        let tablename = tablename.into();
        Self {
            master: master.into(),
            alias: default_alias(&tablename).into(),
            tablename,
            linkage,
            filter: None,
            multiple: true,
        }
    }

    /// Component whose `fkey` references the master's `id`.
    pub fn plain(
        master: impl Into<CompactString>,
        tablename: impl Into<CompactString>,
        fkey: impl Into<CompactString>,
    ) -> Self {
        Self::new(
            master,
            tablename,
            Linkage::Plain {
                pkey: CompactString::const_new("id"),
                fkey: fkey.into(),
            },
        )
    }

    /// Component sharing the super-entity key `key` with the master.
    pub fn super_entity(
        master: impl Into<CompactString>,
        tablename: impl Into<CompactString>,
        key: impl Into<CompactString>,
    ) -> Self {
        Self::new(master, tablename, Linkage::Super { key: key.into() })
    }

    /// Component reached through `link`, keyed on the `id` of both ends.
    pub fn link(
        master: impl Into<CompactString>,
        tablename: impl Into<CompactString>,
        link: impl Into<CompactString>,
        lkey: impl Into<CompactString>,
        rkey: impl Into<CompactString>,
    ) -> Self {
        Self::new(
            master,
            tablename,
            Linkage::Link {
                link: link.into(),
                pkey: CompactString::const_new("id"),
                lkey: lkey.into(),
                rkey: rkey.into(),
                fkey: CompactString::const_new("id"),
            },
        )
    }

    pub fn with_alias(mut self, alias: impl Into<CompactString>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Master-side key for plain and link components.
    pub fn with_pkey(mut self, key: impl Into<CompactString>) -> Self {
        match &mut self.linkage {
            Linkage::Plain { pkey, .. } | Linkage::Link { pkey, .. } => *pkey = key.into(),
            Linkage::Super { .. } => {}
        }
        self
    }

    /// Component-side key for link components.
    pub fn with_fkey(mut self, key: impl Into<CompactString>) -> Self {
        if let Linkage::Link { fkey, .. } = &mut self.linkage {
            *fkey = key.into();
        }
        self
    }

    pub fn filter_by<I, V>(mut self, field: impl Into<CompactString>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter = Some(ComponentFilter {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// At most one component record per master record.
    pub fn single(mut self) -> Self {
        self.multiple = false;
        self
    }

    pub fn master(&self) -> &str {
        &self.master
    }

    pub fn tablename(&self) -> &str {
        &self.tablename
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn linkage(&self) -> &Linkage {
        &self.linkage
    }

    pub fn filter(&self) -> Option<&ComponentFilter> {
        self.filter.as_ref()
    }

    pub fn multiple(&self) -> bool {
        self.multiple
    }

    pub fn link_table(&self) -> Option<TableRef> {
        match &self.linkage {
            Linkage::Link { link, .. } => Some(TableRef::new(link.clone())),
            _ => None,
        }
    }

    /// The component table as it appears in queries. A component whose alias
    /// differs from the default alias of its table is joined under
    /// `<prefix>_<alias>_<name>`, e.g. `org_test_office`.
    pub fn table(&self) -> TableRef {
        if self.alias == default_alias(&self.tablename) {
            return TableRef::new(self.tablename.clone());
        }
        let aliased = match self.tablename.split_once('_') {
            Some((prefix, name)) if !name.is_empty() => {
                format_compact!("{prefix}_{}_{name}", self.alias)
            }
            _ => format_compact!("{}_{}", self.alias, self.tablename),
        };
        TableRef::aliased(self.tablename.clone(), aliased)
    }

    fn filtered(&self, table: &TableRef, join: Predicate) -> Predicate {
        match &self.filter {
            Some(filter) => join & filter.predicate(table),
            None => join,
        }
    }

    /// Inner join condition from `master` to this component, including the
    /// component filter.
    pub fn join(&self, master: &TableRef) -> Predicate {
        let table = self.table();
        let join = match &self.linkage {
            Linkage::Plain { pkey, fkey } => {
                Predicate::eq(table.column(fkey), master.column(pkey))
                    & Predicate::not_deleted(&table)
            }
            Linkage::Super { key } => {
                Predicate::eq(master.column(key), table.column(key))
                    & Predicate::not_deleted(&table)
            }
            Linkage::Link {
                link,
                pkey,
                lkey,
                rkey,
                fkey,
            } => {
                let link = TableRef::new(link.clone());
                Predicate::not_deleted(&link)
                    & (Predicate::eq(link.column(lkey), master.column(pkey))
                        & Predicate::eq(link.column(rkey), table.column(fkey)))
            }
        };
        self.filtered(&table, join)
    }

    /// Left join chain from `master` to this component. Link components
    /// join the link table first.
    pub fn left_join(&self, master: &TableRef) -> SmallVec<[LeftJoin; 2]> {
        let table = self.table();
        match &self.linkage {
            Linkage::Plain { .. } | Linkage::Super { .. } => {
                smallvec![LeftJoin::new(table, self.join(master))]
            }
            Linkage::Link {
                link,
                pkey,
                lkey,
                rkey,
                fkey,
            } => {
                let link = TableRef::new(link.clone());
                let on_link = Predicate::eq(link.column(lkey), master.column(pkey))
                    & Predicate::not_deleted(&link);
                let on_table = self.filtered(
                    &table,
                    Predicate::eq(link.column(rkey), table.column(fkey)),
                );
                smallvec![
                    LeftJoin::new(link, on_link),
                    LeftJoin::new(table, on_table)
                ]
            }
        }
    }

    /// Left join chain from this component back to `master`, used when a
    /// component query needs columns of its master.
    pub fn reverse_left_join(&self, master: &TableRef) -> SmallVec<[LeftJoin; 2]> {
        let table = self.table();
        match &self.linkage {
            Linkage::Plain { pkey, fkey } => smallvec![LeftJoin::new(
                master.clone(),
                Predicate::eq(table.column(fkey), master.column(pkey)),
            )],
            Linkage::Super { key } => smallvec![LeftJoin::new(
                master.clone(),
                Predicate::eq(table.column(key), master.column(key)),
            )],
            Linkage::Link {
                link,
                pkey,
                lkey,
                rkey,
                fkey,
            } => {
                let link = TableRef::new(link.clone());
                let on_link = Predicate::eq(link.column(rkey), table.column(fkey));
                let on_master = Predicate::eq(link.column(lkey), master.column(pkey))
                    & Predicate::not_deleted(&link);
                smallvec![
                    LeftJoin::new(link, on_link),
                    LeftJoin::new(master.clone(), on_master)
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::col;

    fn organisation() -> TableRef {
        TableRef::new("org_organisation")
    }

    #[test]
    fn test_plain_join() {
        let office = ComponentDef::plain("org_organisation", "org_office", "organisation_id");
        let expected = Predicate::eq(
            col("org_office", "organisation_id"),
            col("org_organisation", "id"),
        ) & Predicate::ne(col("org_office", "deleted"), true);
        assert_eq!(office.join(&organisation()), expected);
        assert_eq!(
            office.left_join(&organisation()).as_slice(),
            &[LeftJoin::new(TableRef::new("org_office"), expected)]
        );
    }

    #[test]
    fn test_filtered_alias() {
        let office = ComponentDef::plain("org_organisation", "org_office", "organisation_id")
            .with_alias("test")
            .filter_by("office_type_id", [5]);
        let table = office.table();
        assert_eq!(table.name(), "org_office");
        assert_eq!(table.alias(), "org_test_office");
        let expected = (Predicate::eq(
            col("org_test_office", "organisation_id"),
            col("org_organisation", "id"),
        ) & Predicate::ne(col("org_test_office", "deleted"), true))
            & Predicate::eq(col("org_test_office", "office_type_id"), 5);
        assert_eq!(office.join(&organisation()), expected);
    }

    #[test]
    fn test_empty_filter_never_matches() {
        let office = ComponentDef::plain("org_organisation", "org_office", "organisation_id")
            .with_alias("none")
            .filter_by("office_type_id", Vec::<i64>::new());
        let filter = office.filter().unwrap();
        assert_eq!(filter.predicate(&office.table()), Predicate::Const(false));
    }

    #[test]
    fn test_link_joins() {
        let task = ComponentDef::link(
            "project_project",
            "project_task",
            "project_task_project",
            "project_id",
            "task_id",
        );
        let project = TableRef::new("project_project");
        let lkey = Predicate::eq(col("project_task_project", "project_id"), col("project_project", "id"));
        let rkey = Predicate::eq(col("project_task_project", "task_id"), col("project_task", "id"));
        let link_deleted = Predicate::ne(col("project_task_project", "deleted"), true);

        assert_eq!(
            task.join(&project),
            link_deleted.clone() & (lkey.clone() & rkey.clone())
        );
        assert_eq!(
            task.left_join(&project).as_slice(),
            &[
                LeftJoin::new(TableRef::new("project_task_project"), lkey.clone() & link_deleted.clone()),
                LeftJoin::new(TableRef::new("project_task"), rkey.clone()),
            ]
        );
        assert_eq!(
            task.reverse_left_join(&project).as_slice(),
            &[
                LeftJoin::new(TableRef::new("project_task_project"), rkey),
                LeftJoin::new(project, lkey & link_deleted),
            ]
        );
    }

    #[test]
    fn test_super_join() {
        let identity = ComponentDef::super_entity("pr_person", "pr_contact", "pe_id");
        assert_eq!(
            identity.join(&TableRef::new("pr_person")),
            Predicate::eq(col("pr_person", "pe_id"), col("pr_contact", "pe_id"))
                & Predicate::ne(col("pr_contact", "deleted"), true)
        );
    }
}
