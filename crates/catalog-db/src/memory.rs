//! In-process store used for local runs and tests.
//!
//! Mirrors [`PgStore`](crate::pg_store::PgStore) semantics: ids are
//! assigned on insert, updates report matched rows, and listings are
//! ordered by id.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use catalog_types::{Entity, FieldValue, RecordId};

use crate::error::DbError;

/// A map of records keyed by id.
#[derive(Debug)]
pub struct MemoryStore<E: Entity> {
    records: RwLock<BTreeMap<E::Id, E>>,
    sequence: AtomicU64,
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryStore<E> {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Insert a draft under a freshly allocated id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::IdExhausted`] when no further id can be allocated.
    pub fn insert(&self, draft: &E::Draft) -> Result<E, DbError> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        let id = <E::Id as RecordId>::allocate(sequence).ok_or(DbError::IdExhausted(E::RESOURCE))?;
        let record = E::from_draft(id.clone(), draft.clone());
        self.write().insert(id, record.clone());
        Ok(record)
    }

    /// Apply `patch` to record `id`. Returns 1 if the record exists.
    pub fn update(&self, id: &E::Id, patch: &E::Patch) -> u64 {
        self.write().get_mut(id).map_or(0, |record| {
            record.apply_patch(patch);
            1
        })
    }

    /// Remove record `id`. Returns 1 if it existed.
    pub fn delete(&self, id: &E::Id) -> u64 {
        u64::from(self.write().remove(id).is_some())
    }

    /// Record `id`, if present.
    pub fn find(&self, id: &E::Id) -> Option<E> {
        self.read().get(id).cloned()
    }

    /// Every record, ordered by id.
    pub fn list(&self) -> Vec<E> {
        self.read().values().cloned().collect()
    }

    /// Every record whose `column` equals `value`, ordered by id.
    pub fn list_where(&self, column: &str, value: &FieldValue) -> Vec<E> {
        self.read()
            .values()
            .filter(|record| record.field(column).as_ref() == Some(value))
            .cloned()
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<E::Id, E>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<E::Id, E>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use catalog_types::{Effect, EffectDraft, EffectPatch};

    use super::*;

    fn draft(name: &str) -> EffectDraft {
        EffectDraft {
            name: name.to_owned(),
            description: String::from("test"),
        }
    }

    #[test]
    fn ids_are_assigned_in_sequence() {
        let store = MemoryStore::<Effect>::new();
        let first = store.insert(&draft("Burn")).map(|e| e.id).ok();
        let second = store.insert(&draft("Freeze")).map(|e| e.id).ok();
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let store = MemoryStore::<Effect>::new();
        let _ = store.insert(&draft("Burn"));
        assert_eq!(store.delete(&1), 1);
        assert_eq!(store.delete(&1), 0);
        let next = store.insert(&draft("Freeze")).map(|e| e.id).ok();
        assert_eq!(next, Some(2));
    }

    #[test]
    fn update_reports_missing_rows() {
        let store = MemoryStore::<Effect>::new();
        let patch = EffectPatch {
            name: Some(String::from("Scald")),
            ..EffectPatch::default()
        };
        assert_eq!(store.update(&1, &patch), 0);

        let _ = store.insert(&draft("Burn"));
        assert_eq!(store.update(&1, &patch), 1);
        assert_eq!(store.find(&1).map(|e| e.name), Some(String::from("Scald")));
    }
}
