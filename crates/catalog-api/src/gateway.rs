//! The seam between controllers and the two gateway kinds.
//!
//! Controllers are written once against [`Gateway`]; the database tier
//! plugs in a [`DatabaseGateway`], the service tier a [`ServiceGateway`]
//! or the enriching [`WeaponGateway`].

use async_trait::async_trait;
use catalog_db::{DatabaseGateway, PgRecord};
use catalog_gateway::{ServiceGateway, WeaponGateway};
use catalog_types::{Entity, Weapon, WeaponDraft, WeaponPatch};

/// CRUD operations a controller can call for entity `E`.
///
/// Implementations never fail: refusals are `None` / `false`.
#[async_trait]
pub trait Gateway<E: Entity>: Send + Sync + 'static {
    /// Create a record and return its id.
    async fn create(&self, draft: &E::Draft) -> Option<E::Id>;

    /// Apply a partial update to the record the patch names.
    async fn update(&self, patch: &E::Patch) -> bool;

    /// Delete a record.
    async fn delete(&self, id: &E::Id) -> bool;

    /// Load one record.
    async fn get_by_id(&self, id: &E::Id) -> Option<E>;

    /// Load every record. `None` means the listing itself failed.
    async fn get_all(&self) -> Option<Vec<E>>;
}

/// Listing weapons by category.
#[async_trait]
pub trait WeaponTypes: Send + Sync + 'static {
    /// Every weapon of category `weapon_type`. `None` means the listing
    /// itself failed.
    async fn get_by_type(&self, weapon_type: &str) -> Option<Vec<Weapon>>;
}

#[async_trait]
impl<E: PgRecord> Gateway<E> for DatabaseGateway<E> {
    async fn create(&self, draft: &E::Draft) -> Option<E::Id> {
        Self::create(self, draft).await
    }

    async fn update(&self, patch: &E::Patch) -> bool {
        Self::update(self, patch).await
    }

    async fn delete(&self, id: &E::Id) -> bool {
        Self::delete(self, id).await
    }

    async fn get_by_id(&self, id: &E::Id) -> Option<E> {
        Self::get_by_id(self, id).await
    }

    async fn get_all(&self) -> Option<Vec<E>> {
        Self::get_all(self).await
    }
}

#[async_trait]
impl WeaponTypes for DatabaseGateway<Weapon> {
    async fn get_by_type(&self, weapon_type: &str) -> Option<Vec<Weapon>> {
        Self::get_by_type(self, weapon_type).await
    }
}

#[async_trait]
impl<E: Entity> Gateway<E> for ServiceGateway<E> {
    async fn create(&self, draft: &E::Draft) -> Option<E::Id> {
        Self::create(self, draft).await
    }

    async fn update(&self, patch: &E::Patch) -> bool {
        Self::update(self, patch).await
    }

    async fn delete(&self, id: &E::Id) -> bool {
        Self::delete(self, id).await
    }

    async fn get_by_id(&self, id: &E::Id) -> Option<E> {
        Self::get_by_id(self, id).await
    }

    async fn get_all(&self) -> Option<Vec<E>> {
        Some(Self::get_all(self).await)
    }
}

#[async_trait]
impl Gateway<Weapon> for WeaponGateway {
    async fn create(&self, draft: &WeaponDraft) -> Option<i32> {
        Self::create(self, draft).await
    }

    async fn update(&self, patch: &WeaponPatch) -> bool {
        Self::update(self, patch).await
    }

    async fn delete(&self, id: &i32) -> bool {
        Self::delete(self, *id).await
    }

    async fn get_by_id(&self, id: &i32) -> Option<Weapon> {
        Self::get_by_id(self, *id).await
    }

    async fn get_all(&self) -> Option<Vec<Weapon>> {
        Some(Self::get_all(self).await)
    }
}

#[async_trait]
impl WeaponTypes for WeaponGateway {
    async fn get_by_type(&self, weapon_type: &str) -> Option<Vec<Weapon>> {
        Some(Self::get_by_type(self, weapon_type).await)
    }
}
