//! Thin HTTP controllers for the game data catalog.
//!
//! Both tiers expose the same routes. The database tier answers them from
//! its stores; the service tier forwards them through resilient gateways.
//! Handlers are generic over [`Gateway`], so each route is written once
//! and mounted per domain.
//!
//! ```text
//! POST   /{Entity}            create          200 {Success, Message, Id} | 400
//! PUT    /{Entity}[/{id}]     partial update  200 {Success, Message}     | 400
//! DELETE /{Entity}/{id}       delete          200 {Success, Message}     | 400
//! GET    /{Entity}/{id}       one record      200 record                 | 404
//! GET    /{Entity}            every record    200 [records]
//! GET    /Weapon/type/{type}  weapons by type 200 [weapons]
//! ```
//!
//! # Modules
//!
//! - [`router`] -- route table and middleware
//! - [`gateway`] -- the controller-facing gateway traits
//! - [`tiers`] -- per-tier gateway sets and their construction
//! - [`server`] -- bind, serve, graceful shutdown
//! - [`config`] -- environment lookup helpers shared by the binaries
//! - [`telemetry`] -- tracing subscriber setup
//! - [`error`] -- the failure envelope

pub mod config;
pub mod error;
pub mod gateway;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod tiers;

pub use config::ConfigError;
pub use error::ApiError;
pub use gateway::{Gateway, WeaponTypes};
pub use router::{build_database_router, build_service_router, crud_router, with_middleware};
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use tiers::{DatabaseTier, DomainUrls, ServiceTier, ServiceTierConfig};
