//! Unique integer identifier generation, partitioned by namespace.

use std::collections::{BTreeSet, HashMap};

/// Generates strictly increasing integer IDs, unique for the lifetime of
/// this namespace.
///
/// IDs may be associated with a string key: a later `create` call with the
/// same key recovers the same ID, which keeps identifiers stable across
/// re-creation of the object they name. Recycled IDs lose their
/// associations and are reused before the counter advances.
#[derive(Debug, Clone, Default)]
pub struct IdNamespace {
    last_id: u64,
    recycled: BTreeSet<u64>,
    associations: HashMap<String, u64>,
}

impl IdNamespace {
    /// Creates and returns a new ID value.
    ///
    /// Resolution order: the ID already associated with `key` (if any),
    /// then the lowest recycled ID, then a fresh counter value. When `key`
    /// is given and a new ID is produced, the key is associated with it.
    pub fn create(&mut self, key: Option<&str>) -> u64 {
        if let Some(key) = key {
            if let Some(&id) = self.associations.get(key) {
                return id;
            }
        }
        let id = match self.recycled.pop_first() {
            Some(id) => id,
            None => {
                self.last_id += 1;
                self.last_id
            }
        };
        if let Some(key) = key {
            self.associate(id, key);
        }
        id
    }

    /// Associates the given ID with a key so `create` can recover it later.
    ///
    /// Only IDs this namespace could have produced are accepted.
    pub fn associate(&mut self, id: u64, key: &str) {
        if id != 0 && id <= self.last_id && !key.is_empty() {
            self.associations.insert(key.to_string(), id);
        }
    }

    /// Marks an ID as no longer identifying anything.
    ///
    /// Its associations are dropped and the value becomes available for
    /// reuse by `create`.
    pub fn recycle(&mut self, id: u64) {
        if id != 0 && id <= self.last_id {
            self.recycled.insert(id);
            self.associations.retain(|_, v| *v != id);
        }
    }
}

/// Holds one [`IdNamespace`] per name.
///
/// This is an explicit context object: construct one at startup (or one per
/// graph) and pass it where IDs are needed. There is no process-wide
/// singleton.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    namespaces: HashMap<String, IdNamespace>,
}

impl IdRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the namespace for the given name, creating it on first use.
    pub fn namespace(&mut self, name: &str) -> &mut IdNamespace {
        self.namespaces.entry(name.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing_and_unique() {
        let mut ns = IdNamespace::default();
        let mut seen = Vec::new();
        for _ in 0..100 {
            let id = ns.create(None);
            assert!(!seen.contains(&id));
            if let Some(&last) = seen.last() {
                assert!(id > last);
            }
            seen.push(id);
        }
    }

    #[test]
    fn keyed_creation_recovers_the_same_id() {
        let mut ns = IdNamespace::default();
        let a = ns.create(Some("node-a"));
        let b = ns.create(Some("node-b"));
        assert_ne!(a, b);
        assert_eq!(ns.create(Some("node-a")), a);
        assert_eq!(ns.create(Some("node-b")), b);
    }

    #[test]
    fn recycled_ids_are_reused_and_lose_associations() {
        let mut ns = IdNamespace::default();
        let a = ns.create(Some("pin"));
        let _b = ns.create(None);
        ns.recycle(a);
        // The association is gone, so the key now resolves to a new id,
        // which is the recycled one.
        let c = ns.create(Some("pin"));
        assert_eq!(c, a);
    }

    #[test]
    fn namespaces_are_independent() {
        let mut registry = IdRegistry::new();
        let n1 = registry.namespace("node").create(None);
        let p1 = registry.namespace("pin").create(None);
        assert_eq!(n1, p1); // both start from 1 in their own namespace
        assert_ne!(registry.namespace("node").create(None), n1);
    }
}
