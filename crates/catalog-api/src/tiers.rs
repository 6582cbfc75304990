//! Gateway sets for each tier, constructed explicitly and handed to the
//! router builders.

use std::sync::Arc;
use std::time::Duration;

use catalog_db::{DatabaseGateway, EntityStore, PgRecord, PostgresPool};
use catalog_gateway::{DownstreamClient, DownstreamError, ServiceGateway, WeaponGateway};
use catalog_resilience::{ResiliencePolicy, ResilientInvoker};
use catalog_types::{Armour, Attack, Creature, Effect, Entity, Feat, Jewellery, Weapon};

/// One database gateway per domain.
#[derive(Debug, Clone)]
pub struct DatabaseTier {
    /// Weapons.
    pub weapons: Arc<DatabaseGateway<Weapon>>,
    /// Armour.
    pub armour: Arc<DatabaseGateway<Armour>>,
    /// Jewellery.
    pub jewellery: Arc<DatabaseGateway<Jewellery>>,
    /// Effects.
    pub effects: Arc<DatabaseGateway<Effect>>,
    /// Feats.
    pub feats: Arc<DatabaseGateway<Feat>>,
    /// Attacks.
    pub attacks: Arc<DatabaseGateway<Attack>>,
    /// Creatures.
    pub creatures: Arc<DatabaseGateway<Creature>>,
}

#[derive(Clone, Copy)]
enum Backend<'a> {
    Postgres(&'a PostgresPool),
    Memory,
}

impl Backend<'_> {
    fn gateway<E: PgRecord>(self) -> Arc<DatabaseGateway<E>> {
        let store = match self {
            Self::Postgres(pool) => EntityStore::postgres(pool),
            Self::Memory => EntityStore::memory(),
        };
        Arc::new(DatabaseGateway::new(store))
    }
}

impl DatabaseTier {
    /// Every domain backed by its `PostgreSQL` table in `pool`.
    pub fn postgres(pool: &PostgresPool) -> Self {
        Self::build(Backend::Postgres(pool))
    }

    /// Every domain backed by an empty in-memory store.
    pub fn memory() -> Self {
        Self::build(Backend::Memory)
    }

    fn build(backend: Backend<'_>) -> Self {
        Self {
            weapons: backend.gateway(),
            armour: backend.gateway(),
            jewellery: backend.gateway(),
            effects: backend.gateway(),
            feats: backend.gateway(),
            attacks: backend.gateway(),
            creatures: backend.gateway(),
        }
    }
}

/// Database-tier base URL for each domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainUrls {
    /// Weapon database tier.
    pub weapon: String,
    /// Armour database tier.
    pub armour: String,
    /// Jewellery database tier.
    pub jewellery: String,
    /// Effect database tier.
    pub effect: String,
    /// Feat database tier.
    pub feat: String,
    /// Attack database tier.
    pub attack: String,
    /// Creature database tier.
    pub creature: String,
}

impl DomainUrls {
    /// Every domain served by the same database tier.
    pub fn uniform(url: &str) -> Self {
        Self {
            weapon: url.to_owned(),
            armour: url.to_owned(),
            jewellery: url.to_owned(),
            effect: url.to_owned(),
            feat: url.to_owned(),
            attack: url.to_owned(),
            creature: url.to_owned(),
        }
    }
}

/// Everything needed to reach the downstreams of the service tier.
#[derive(Debug, Clone)]
pub struct ServiceTierConfig {
    /// Database-tier base URL per domain.
    pub database_urls: DomainUrls,
    /// Base URL of the effect service used for weapon enrichment.
    pub effect_service_url: String,
    /// Client-level timeout for one HTTP request.
    pub request_timeout: Duration,
    /// Retry and breaker policy, instantiated once per downstream.
    pub policy: ResiliencePolicy,
}

impl ServiceTierConfig {
    fn gateway<E: Entity>(
        &self,
        url: &str,
        name: String,
    ) -> Result<ServiceGateway<E>, DownstreamError> {
        let client = DownstreamClient::new(url, self.request_timeout)?;
        let invoker = Arc::new(ResilientInvoker::new(name, &self.policy));
        Ok(ServiceGateway::new(client, invoker))
    }

    fn database<E: Entity>(&self, url: &str) -> Result<ServiceGateway<E>, DownstreamError> {
        self.gateway(url, format!("{} database", E::RESOURCE))
    }
}

/// One service gateway per domain. Each owns its own client and breaker.
#[derive(Debug, Clone)]
pub struct ServiceTier {
    /// Weapons, with effect enrichment.
    pub weapons: Arc<WeaponGateway>,
    /// Armour.
    pub armour: Arc<ServiceGateway<Armour>>,
    /// Jewellery.
    pub jewellery: Arc<ServiceGateway<Jewellery>>,
    /// Effects.
    pub effects: Arc<ServiceGateway<Effect>>,
    /// Feats.
    pub feats: Arc<ServiceGateway<Feat>>,
    /// Attacks.
    pub attacks: Arc<ServiceGateway<Attack>>,
    /// Creatures.
    pub creatures: Arc<ServiceGateway<Creature>>,
}

impl ServiceTier {
    /// Build every gateway from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DownstreamError`] if a base URL is invalid or an HTTP
    /// client cannot be built.
    pub fn connect(config: &ServiceTierConfig) -> Result<Self, DownstreamError> {
        let urls = &config.database_urls;
        let effect_lookup =
            config.gateway::<Effect>(&config.effect_service_url, String::from("Effect service"))?;

        Ok(Self {
            weapons: Arc::new(WeaponGateway::new(
                config.database(&urls.weapon)?,
                effect_lookup,
            )),
            armour: Arc::new(config.database(&urls.armour)?),
            jewellery: Arc::new(config.database(&urls.jewellery)?),
            effects: Arc::new(config.database(&urls.effect)?),
            feats: Arc::new(config.database(&urls.feat)?),
            attacks: Arc::new(config.database(&urls.attack)?),
            creatures: Arc::new(config.database(&urls.creature)?),
        })
    }
}
