//! Generic `PostgreSQL` store for any [`PgRecord`].
//!
//! Statements are assembled with [`QueryBuilder`]: column names come from
//! the entity definition (never from request data) and every value is a
//! bound parameter.

use std::marker::PhantomData;

use catalog_types::{Entity, FieldValue, RecordId};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::DbError;
use crate::record::PgRecord;

/// CRUD operations on the table backing `E`.
#[derive(Debug, Clone)]
pub struct PgStore<E> {
    pool: PgPool,
    entity: PhantomData<fn() -> E>,
}

impl<E: PgRecord> PgStore<E> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            entity: PhantomData,
        }
    }

    /// Insert a draft and return the stored row, id included.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, draft: &E::Draft) -> Result<E, DbError> {
        let mut query = insert_query::<E>(draft);
        let row = query.build().fetch_one(&self.pool).await?;
        Ok(E::from_row(&row)?)
    }

    /// Write the fields present in `patch` to row `id` and return the
    /// number of rows matched.
    ///
    /// An empty patch writes nothing and reports whether the row exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn update(&self, id: &E::Id, patch: &E::Patch) -> Result<u64, DbError> {
        let fields = E::patch_fields(patch);
        if fields.is_empty() {
            return Ok(u64::from(self.find(id).await?.is_some()));
        }
        let mut query = update_query::<E>(id, fields);
        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Delete row `id` and return the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn delete(&self, id: &E::Id) -> Result<u64, DbError> {
        let mut query = delete_query::<E>(id);
        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Load row `id`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn find(&self, id: &E::Id) -> Result<Option<E>, DbError> {
        let mut query = select_query::<E>(Some(("id", id.to_field())));
        let row = query.build().fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(E::from_row).transpose()?)
    }

    /// Load every row, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self) -> Result<Vec<E>, DbError> {
        let mut query = select_query::<E>(None);
        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(E::from_row).collect::<Result<_, _>>()?)
    }

    /// Load every row whose `column` equals `value`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_where(
        &self,
        column: &'static str,
        value: FieldValue,
    ) -> Result<Vec<E>, DbError> {
        let mut query = select_query::<E>(Some((column, value)));
        let rows = query.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(E::from_row).collect::<Result<_, _>>()?)
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: FieldValue) {
    match value {
        FieldValue::Int(v) => builder.push_bind(v),
        FieldValue::Float(v) => builder.push_bind(v),
        FieldValue::Text(v) => builder.push_bind(v),
    };
}

fn insert_query<E: PgRecord>(draft: &E::Draft) -> QueryBuilder<'static, Postgres> {
    let (columns, values): (Vec<&str>, Vec<FieldValue>) =
        E::draft_fields(draft).into_iter().unzip();

    let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", E::TABLE));
    builder.push(columns.join(", "));
    builder.push(") VALUES (");
    for (index, value) in values.into_iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, value);
    }
    builder.push(") RETURNING *");
    builder
}

fn update_query<E: PgRecord>(
    id: &E::Id,
    fields: Vec<(&'static str, FieldValue)>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));
    for (index, (column, value)) in fields.into_iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        builder.push(column);
        builder.push(" = ");
        push_value(&mut builder, value);
    }
    builder.push(" WHERE id = ");
    push_value(&mut builder, id.to_field());
    builder
}

fn delete_query<E: PgRecord>(id: &E::Id) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", E::TABLE));
    push_value(&mut builder, id.to_field());
    builder
}

fn select_query<E: PgRecord>(
    filter: Option<(&'static str, FieldValue)>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT * FROM {}", E::TABLE));
    if let Some((column, value)) = filter {
        builder.push(format!(" WHERE {column} = "));
        push_value(&mut builder, value);
    }
    builder.push(" ORDER BY id");
    builder
}
