use crate::expr::Predicate;
use crate::schema::TableRef;
use std::fmt;

/// Supplies the predicate restricting a table to the records the caller may
/// see. Combined with soft-delete exclusion it forms the active-record
/// predicate every resource query starts from.
pub trait AccessPolicy: fmt::Debug + Send + Sync {
    fn accessible(&self, table: &TableRef) -> Predicate;
}

/// Every record that is not deleted: `(t.deleted <> 'T') AND (t.id > 0)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActiveRecords;

impl AccessPolicy for ActiveRecords {
    fn accessible(&self, table: &TableRef) -> Predicate {
        Predicate::not_deleted(table) & Predicate::gt(table.column("id"), 0)
    }
}

/// Active records further restricted by an owner column, e.g. only records
/// of the caller's own organisation.
#[derive(Clone, Debug)]
pub struct OwnedBy {
    pub field: &'static str,
    pub owner: i64,
}

impl AccessPolicy for OwnedBy {
    fn accessible(&self, table: &TableRef) -> Predicate {
        ActiveRecords.accessible(table) & Predicate::eq(table.column(self.field), self.owner)
    }
}
