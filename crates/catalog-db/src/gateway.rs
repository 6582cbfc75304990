//! Database-tier gateway: store results folded into the shapes the HTTP
//! layer answers with.
//!
//! Store failures are logged here and surface as `None` / `false`. The
//! one exception is a failed listing, which is `None` rather than an empty
//! list so the caller can tell "no rows" apart from "store down".

use catalog_types::{Entity, FieldValue, Weapon};

use crate::record::PgRecord;
use crate::store::EntityStore;

/// Column filtered by the weapon-type listing.
const WEAPON_TYPE_COLUMN: &str = "weapon_type";

/// Persistence gateway for one catalog domain.
#[derive(Debug)]
pub struct DatabaseGateway<E: PgRecord> {
    store: EntityStore<E>,
}

impl<E: PgRecord> DatabaseGateway<E> {
    /// Wrap a store.
    pub const fn new(store: EntityStore<E>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &EntityStore<E> {
        &self.store
    }

    /// Persist a new record. Returns its id, or `None` on failure.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE))]
    pub async fn create(&self, draft: &E::Draft) -> Option<E::Id> {
        match self.store.insert(draft).await {
            Ok(record) => {
                tracing::info!(id = %record.id(), "Record created");
                Some(record.id().clone())
            }
            Err(error) => {
                tracing::error!(%error, "Failed to create record");
                None
            }
        }
    }

    /// Apply the fields present in `patch` to the record it names.
    ///
    /// Returns `true` only when exactly one record matched.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE))]
    pub async fn update(&self, patch: &E::Patch) -> bool {
        let Some(id) = E::patch_id(patch) else {
            tracing::warn!("Update rejected: no id");
            return false;
        };
        match self.store.update(id, patch).await {
            Ok(1) => true,
            Ok(matched) => {
                tracing::warn!(%id, matched, "Update matched no single record");
                false
            }
            Err(error) => {
                tracing::error!(%id, %error, "Failed to update record");
                false
            }
        }
    }

    /// Remove record `id`. Returns `true` only when it existed.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE, id = %id))]
    pub async fn delete(&self, id: &E::Id) -> bool {
        match self.store.delete(id).await {
            Ok(1) => true,
            Ok(removed) => {
                tracing::warn!(removed, "Delete matched no single record");
                false
            }
            Err(error) => {
                tracing::error!(%error, "Failed to delete record");
                false
            }
        }
    }

    /// Load record `id`. Missing records and store failures are `None`.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE, id = %id))]
    pub async fn get_by_id(&self, id: &E::Id) -> Option<E> {
        self.store.find(id).await.unwrap_or_else(|error| {
            tracing::error!(%error, "Failed to load record");
            None
        })
    }

    /// Load every record. `None` means the store failed.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE))]
    pub async fn get_all(&self) -> Option<Vec<E>> {
        self.store
            .list()
            .await
            .inspect_err(|error| tracing::error!(%error, "Failed to list records"))
            .ok()
    }

    /// Load every record whose `column` equals `value`.
    #[tracing::instrument(skip_all, fields(entity = E::RESOURCE, column = %column))]
    pub async fn find_by(&self, column: &'static str, value: FieldValue) -> Option<Vec<E>> {
        self.store
            .list_where(column, value)
            .await
            .inspect_err(|error| tracing::error!(%error, "Failed to filter records"))
            .ok()
    }
}

impl DatabaseGateway<Weapon> {
    /// Every weapon of category `weapon_type`.
    pub async fn get_by_type(&self, weapon_type: &str) -> Option<Vec<Weapon>> {
        self.find_by(WEAPON_TYPE_COLUMN, FieldValue::from(weapon_type.to_owned()))
            .await
    }
}
