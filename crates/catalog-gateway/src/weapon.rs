//! Weapon gateway with effect-name enrichment.
//!
//! Weapons store only an `EffectId`. Reads resolve it to the effect's name
//! through the effect service. Lookups run concurrently, one per distinct
//! id, and are all joined before the weapons are returned.

use std::collections::{BTreeSet, HashMap};

use catalog_types::{Effect, Entity, Weapon, WeaponDraft, WeaponPatch};
use futures::future::join_all;

use crate::service::ServiceGateway;

/// Path segment of the weapon-type listing.
const TYPE_SEGMENT: &str = "type";

/// Service-tier gateway for weapons.
#[derive(Debug)]
pub struct WeaponGateway {
    weapons: ServiceGateway<Weapon>,
    effects: ServiceGateway<Effect>,
}

impl WeaponGateway {
    /// Combine the weapon gateway with the effect lookup used for
    /// enrichment.
    pub const fn new(weapons: ServiceGateway<Weapon>, effects: ServiceGateway<Effect>) -> Self {
        Self { weapons, effects }
    }

    /// The un-enriched weapon gateway.
    pub const fn weapons(&self) -> &ServiceGateway<Weapon> {
        &self.weapons
    }

    /// See [`ServiceGateway::create`].
    pub async fn create(&self, draft: &WeaponDraft) -> Option<i32> {
        self.weapons.create(draft).await
    }

    /// See [`ServiceGateway::update`].
    pub async fn update(&self, patch: &WeaponPatch) -> bool {
        self.weapons.update(patch).await
    }

    /// See [`ServiceGateway::delete`].
    pub async fn delete(&self, id: i32) -> bool {
        self.weapons.delete(&id).await
    }

    /// One weapon with its effect name resolved.
    pub async fn get_by_id(&self, id: i32) -> Option<Weapon> {
        let mut weapon = self.weapons.get_by_id(&id).await?;
        self.enrich(std::slice::from_mut(&mut weapon)).await;
        Some(weapon)
    }

    /// Every weapon, in database order, with effect names resolved.
    pub async fn get_all(&self) -> Vec<Weapon> {
        let mut weapons = self.weapons.get_all().await;
        self.enrich(&mut weapons).await;
        weapons
    }

    /// Every weapon of category `weapon_type`, with effect names resolved.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_type(&self, weapon_type: &str) -> Vec<Weapon> {
        let mut weapons = self
            .weapons
            .get_list(&[Weapon::RESOURCE, TYPE_SEGMENT, weapon_type])
            .await;
        self.enrich(&mut weapons).await;
        weapons
    }

    /// Set `effect` on every weapon that references one.
    ///
    /// A reference that cannot be resolved becomes the empty string; a
    /// weapon without a reference keeps `None`.
    async fn enrich(&self, weapons: &mut [Weapon]) {
        let ids: BTreeSet<i32> = weapons.iter().filter_map(|w| w.effect_id).collect();
        if ids.is_empty() {
            return;
        }

        let lookups = ids.into_iter().map(|id| async move {
            let name = self.effects.get_by_id(&id).await.map(|effect| effect.name);
            if name.is_none() {
                tracing::warn!(effect_id = id, "Effect lookup failed, using empty name");
            }
            (id, name.unwrap_or_default())
        });
        let names: HashMap<i32, String> = join_all(lookups).await.into_iter().collect();

        for weapon in weapons {
            weapon.effect = weapon
                .effect_id
                .map(|id| names.get(&id).cloned().unwrap_or_default());
        }
    }
}
