//! Rows returned by the store, keyed by column name (`table.field`).
//!
//! Joining multiple-record components multiplies master rows. Extraction
//! collapses them again: one row per master record, with the values of
//! columns reached through such joins gathered into lists.

use crate::value::Value;
use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    values: Vec<(CompactString, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, replacing an earlier value.
    pub fn insert(&mut self, colname: impl Into<CompactString>, value: impl Into<Value>) {
        let colname = colname.into();
        let value = value.into();
        match self.values.iter_mut().find(|(c, _)| *c == colname) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((colname, value)),
        }
    }

    pub fn with(mut self, colname: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        self.insert(colname, value);
        self
    }

    pub fn get(&self, colname: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(c, _)| c == colname)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<CompactString>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Merges rows sharing the same `key` value, groups in order of their
/// first row. Columns in `list_columns` become lists of their distinct
/// non-null values, all other columns keep the value of the first row.
pub fn collapse_rows(rows: Vec<Row>, key: &str, list_columns: &[&str]) -> Vec<Row> {
    let mut groups: Vec<Vec<Row>> = Vec::new();
    let mut index: HashMap<CompactString, usize> = HashMap::new();
    for row in rows {
        let group_key = row.get(key).map_or_else(|| Value::Null.set_key(), Value::set_key);
        let slot = *index.entry(group_key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(row);
    }

    groups
        .into_iter()
        .map(|group| collapse_group(group, list_columns))
        .collect()
}

fn collapse_group(group: Vec<Row>, list_columns: &[&str]) -> Row {
    let mut collapsed = Row::new();
    for row in group {
        for (colname, value) in row.values {
            let is_list = list_columns.contains(&colname.as_str());
            match collapsed.values.iter_mut().find(|(c, _)| *c == colname) {
                Some((_, Value::List(items))) if is_list => {
                    if !value.is_null() && !items.contains(&value) {
                        items.push(value);
                    }
                }
                Some(_) => {}
                None if is_list => {
                    let items = if value.is_null() { vec![] } else { vec![value] };
                    collapsed.values.push((colname, Value::List(items)));
                }
                None => collapsed.values.push((colname, value)),
            }
        }
    }
    collapsed
}

/// Number of distinct non-null values of `key` across `rows`.
pub fn count_distinct(rows: &[Row], key: &str) -> usize {
    rows.iter()
        .filter_map(|row| row.get(key))
        .filter(|v| !v.is_null())
        .map(Value::set_key)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_rows() -> Vec<Row> {
        vec![
            Row::new()
                .with("org_organisation.id", 1)
                .with("org_organisation.name", "Red Cross")
                .with("org_office.name", "North"),
            Row::new()
                .with("org_organisation.id", 2)
                .with("org_organisation.name", "Blue Cross")
                .with("org_office.name", "Central"),
            Row::new()
                .with("org_organisation.id", 1)
                .with("org_organisation.name", "Red Cross")
                .with("org_office.name", "South"),
        ]
    }

    #[test]
    fn test_collapse_rows() {
        let rows = collapse_rows(office_rows(), "org_organisation.id", &["org_office.name"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("org_organisation.name"), Some(&Value::from("Red Cross")));
        assert_eq!(
            rows[0].get("org_office.name"),
            Some(&Value::List(vec!["North".into(), "South".into()]))
        );
        assert_eq!(
            rows[1].get("org_office.name"),
            Some(&Value::List(vec!["Central".into()]))
        );

        let rows = collapse_rows(office_rows(), "org_organisation.id", &[]);
        assert_eq!(rows[0].get("org_office.name"), Some(&Value::from("North")));
    }

    #[test]
    fn test_count_distinct() {
        assert_eq!(count_distinct(&office_rows(), "org_organisation.id"), 2);
        assert_eq!(count_distinct(&office_rows(), "org_office.name"), 3);
        assert_eq!(count_distinct(&office_rows(), "missing"), 0);
    }

    #[test]
    fn test_insert_replaces() {
        let mut row = Row::new().with("t.a", 1);
        row.insert("t.a", 2);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("t.a"), Some(&Value::Int(2)));
    }
}
