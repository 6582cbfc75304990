//! Backend selection for a single entity store.

use catalog_types::FieldValue;

use crate::error::DbError;
use crate::memory::MemoryStore;
use crate::pg_store::PgStore;
use crate::postgres::PostgresPool;
use crate::record::PgRecord;

/// Persistence backend for one catalog domain.
#[derive(Debug)]
pub enum EntityStore<E: PgRecord> {
    /// Rows in a `PostgreSQL` table.
    Postgres(PgStore<E>),
    /// Records held in process memory.
    Memory(MemoryStore<E>),
}

impl<E: PgRecord> EntityStore<E> {
    /// A store backed by `pool`.
    pub fn postgres(pool: &PostgresPool) -> Self {
        Self::Postgres(PgStore::new(pool.pool().clone()))
    }

    /// An empty in-memory store.
    pub const fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Short backend name for logs.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Insert a draft and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend rejects the insert.
    pub async fn insert(&self, draft: &E::Draft) -> Result<E, DbError> {
        match self {
            Self::Postgres(store) => store.insert(draft).await,
            Self::Memory(store) => store.insert(draft),
        }
    }

    /// Apply a partial update and return the number of rows matched.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails.
    pub async fn update(&self, id: &E::Id, patch: &E::Patch) -> Result<u64, DbError> {
        match self {
            Self::Postgres(store) => store.update(id, patch).await,
            Self::Memory(store) => Ok(store.update(id, patch)),
        }
    }

    /// Delete a record and return the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails.
    pub async fn delete(&self, id: &E::Id) -> Result<u64, DbError> {
        match self {
            Self::Postgres(store) => store.delete(id).await,
            Self::Memory(store) => Ok(store.delete(id)),
        }
    }

    /// Load one record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails.
    pub async fn find(&self, id: &E::Id) -> Result<Option<E>, DbError> {
        match self {
            Self::Postgres(store) => store.find(id).await,
            Self::Memory(store) => Ok(store.find(id)),
        }
    }

    /// Load every record, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails.
    pub async fn list(&self) -> Result<Vec<E>, DbError> {
        match self {
            Self::Postgres(store) => store.list().await,
            Self::Memory(store) => Ok(store.list()),
        }
    }

    /// Load every record whose `column` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails.
    pub async fn list_where(
        &self,
        column: &'static str,
        value: FieldValue,
    ) -> Result<Vec<E>, DbError> {
        match self {
            Self::Postgres(store) => store.list_where(column, value).await,
            Self::Memory(store) => Ok(store.list_where(column, &value)),
        }
    }
}
