//! Database tier for the game data catalog.
//!
//! Each catalog domain gets one [`DatabaseGateway`] over an
//! [`EntityStore`]. The store is either a `PostgreSQL` table or an
//! in-process map; both report matched rows so that updates and deletes of
//! missing records are failures rather than silent successes.
//!
//! ```text
//! HTTP handler
//!     |
//!     +-- DatabaseGateway<E>   (logs, folds errors into bool / Option)
//!         |
//!         +-- EntityStore<E>
//!             |-- Postgres(PgStore<E>)    one table per domain
//!             +-- Memory(MemoryStore<E>)  local runs and tests
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool, configuration and migrations
//! - [`record`] -- table names and row decoding per domain
//! - [`pg_store`] -- generic parameterized CRUD statements
//! - [`memory`] -- in-process store
//! - [`store`] -- backend selection
//! - [`gateway`] -- the database-tier gateway
//! - [`error`] -- shared error types

pub mod error;
pub mod gateway;
pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod record;
pub mod store;

pub use error::DbError;
pub use gateway::DatabaseGateway;
pub use memory::MemoryStore;
pub use pg_store::PgStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use record::PgRecord;
pub use store::EntityStore;
