//! Capability probing.
//!
//! A backend describes what it *could* map (a candidate table of
//! identifier → native handle) and what its engine *does* implement (the
//! reported list). The [`SupportMap`] is their intersection. Backends build
//! their maps once and keep them for the lifetime of the process.

use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Identifier → backend-native handle, restricted to what the engine
/// actually implements. Ordered, so iteration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportMap<K: Ord, V> {
    entries: BTreeMap<K, V>,
}

impl<K, V> SupportMap<K, V>
where
    K: Ord + Copy + fmt::Display,
    V: Copy + PartialEq + fmt::Debug,
{
    /// Keep every candidate whose native handle appears in `reported`.
    /// Missing handles are dropped silently (logged at `debug`).
    pub fn probe(candidates: &[(K, V)], reported: &[V]) -> Self {
        let mut entries = BTreeMap::new();
        for &(id, native) in candidates {
            if reported.contains(&native) {
                entries.insert(id, native);
            } else {
                debug!(
                    target: "crypto::probe",
                    algorithm = %id,
                    native = ?native,
                    "Engine does not implement algorithm, omitting"
                );
            }
        }
        Self { entries }
    }
}

impl<K: Ord, V> SupportMap<K, V> {
    pub fn get(&self, id: &K) -> Option<&V> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.entries.contains_key(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
