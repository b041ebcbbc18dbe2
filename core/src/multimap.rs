//! Insertion-ordered multimap.
//!
//! Keys keep the order of their first insertion and every key holds an
//! ordered list of values. Appending under an existing key never replaces
//! what is already there: duplicate values are allowed and preserved. Join
//! plans rely on this, because a chain of left joins for one table must keep
//! its order and because merging the joins of several filters intentionally
//! keeps every contribution.

use compact_str::CompactString;
use hashbrown::HashMap;

#[derive(Clone, Debug)]
pub struct OrderedMultiMap<V> {
    entries: Vec<(CompactString, Vec<V>)>,
    index: HashMap<CompactString, usize>,
}

impl<V> Default for OrderedMultiMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: PartialEq> PartialEq for OrderedMultiMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V> OrderedMultiMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value under `key`, creating the key at the end if new.
    pub fn append(&mut self, key: impl Into<CompactString>, value: V) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1.push(value),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value]));
            }
        }
    }

    /// Appends every value under `key`, preserving their order.
    pub fn extend<I>(&mut self, key: impl Into<CompactString>, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        let key = key.into();
        for value in values {
            self.append(key.clone(), value);
        }
    }

    /// Moves all entries of `other` into `self`, appending per key.
    pub fn merge(&mut self, other: OrderedMultiMap<V>) {
        for (key, values) in other.entries {
            self.extend(key, values);
        }
    }

    pub fn get(&self, key: &str) -> Option<&[V]> {
        self.index.get(key).map(|&i| self.entries[i].1.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Removes a key and all its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<V>> {
        let i = self.index.remove(key)?;
        let (_, values) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(values)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// All values in key order, then insertion order within each key.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().flat_map(|(_, v)| v.iter())
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of values across all keys.
    pub fn value_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

impl<V: PartialEq + Clone> OrderedMultiMap<V> {
    /// Flattens to a list, skipping values equal to one already emitted.
    pub fn to_unique_list(&self) -> Vec<V> {
        let mut out: Vec<V> = Vec::with_capacity(self.value_count());
        for value in self.values() {
            if !out.contains(value) {
                out.push(value.clone());
            }
        }
        out
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMultiMap<V>
where
    K: Into<CompactString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_key_and_value_order() {
        let mut map = OrderedMultiMap::new();
        map.append("b", 1);
        map.append("a", 2);
        map.append("b", 3);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b"), Some(&[1, 3][..]));
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1, 3, 2]);
    }

    #[test]
    fn test_merge_appends_duplicates() {
        let mut left: OrderedMultiMap<i32> = [("t", 1)].into_iter().collect();
        let right: OrderedMultiMap<i32> = [("t", 1), ("u", 2)].into_iter().collect();
        left.merge(right);
        assert_eq!(left.get("t"), Some(&[1, 1][..]));
        assert_eq!(left.value_count(), 3);
        assert_eq!(left.to_unique_list(), vec![1, 2]);
    }

    #[test]
    fn test_remove_reindexes() {
        let mut map: OrderedMultiMap<i32> =
            [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(map.remove("a"), Some(vec![1]));
        assert_eq!(map.get("c"), Some(&[3][..]));
        map.append("b", 4);
        assert_eq!(map.get("b"), Some(&[2, 4][..]));
        assert!(map.remove("a").is_none());
    }
}
