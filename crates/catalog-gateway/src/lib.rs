//! Service-tier gateways for the game data catalog.
//!
//! A [`ServiceGateway`] forwards one domain's CRUD operations to the
//! database tier over HTTP/JSON. Every call goes through a shared
//! [`ResilientInvoker`](catalog_resilience::ResilientInvoker), so
//! transport failures and non-success statuses are retried and counted by
//! the circuit breaker. [`WeaponGateway`] adds effect-name enrichment on
//! top of the weapon gateway.
//!
//! # Modules
//!
//! - [`client`] -- `reqwest` client bound to one base URL
//! - [`service`] -- the generic gateway
//! - [`weapon`] -- weapon enrichment
//! - [`error`] -- downstream error type

pub mod client;
pub mod error;
pub mod service;
pub mod weapon;

pub use client::DownstreamClient;
pub use error::DownstreamError;
pub use service::ServiceGateway;
pub use weapon::WeaponGateway;
