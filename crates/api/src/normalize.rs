//! Collapse empty collections to "absent".
//!
//! Output formats treat a missing key and an empty list/table differently, and the
//! generated manifests should never contain empty sections. Projections call
//! [`NullIfEmpty::null_if_empty`] on every collection they copy out of a model.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::{Map, Value};

/// Types with a notion of emptiness that can be normalized to `None`.
pub trait NullIfEmpty: Sized {
    /// `None` if the collection is empty, otherwise a copy of it.
    fn null_if_empty(&self) -> Option<Self>;
}

impl<T: Clone> NullIfEmpty for Vec<T> {
    fn null_if_empty(&self) -> Option<Self> {
        (!self.is_empty()).then(|| self.clone())
    }
}

impl<T: Clone + Ord> NullIfEmpty for BTreeSet<T> {
    fn null_if_empty(&self) -> Option<Self> {
        (!self.is_empty()).then(|| self.clone())
    }
}

impl<K: Clone + Ord, V: Clone> NullIfEmpty for BTreeMap<K, V> {
    fn null_if_empty(&self) -> Option<Self> {
        (!self.is_empty()).then(|| self.clone())
    }
}

impl<K: Clone + Eq + std::hash::Hash, V: Clone> NullIfEmpty for HashMap<K, V> {
    fn null_if_empty(&self) -> Option<Self> {
        (!self.is_empty()).then(|| self.clone())
    }
}

impl NullIfEmpty for Map<String, Value> {
    fn null_if_empty(&self) -> Option<Self> {
        (!self.is_empty()).then(|| self.clone())
    }
}

/// Free-function form of [`NullIfEmpty::null_if_empty`].
pub fn normalize<C: NullIfEmpty>(collection: &C) -> Option<C> {
    collection.null_if_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collections_become_none() {
        assert_eq!(Vec::<String>::new().null_if_empty(), None);
        assert_eq!(BTreeSet::<String>::new().null_if_empty(), None);
        assert_eq!(BTreeMap::<String, bool>::new().null_if_empty(), None);
        assert_eq!(Map::new().null_if_empty(), None);
    }

    #[test]
    fn non_empty_collections_are_preserved_in_order() {
        let list = vec!["b".to_string(), "a".to_string(), "c".to_string()];
        assert_eq!(normalize(&list), Some(list.clone()));

        let mut map = BTreeMap::new();
        map.insert("permission.a".to_string(), true);
        assert_eq!(normalize(&map), Some(map.clone()));
    }
}
