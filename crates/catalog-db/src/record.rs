//! Row mapping between catalog records and `PostgreSQL` tables.

use catalog_types::{Armour, Attack, Creature, Effect, Entity, Feat, Jewellery, Weapon};
use sqlx::Row;
use sqlx::postgres::PgRow;

/// A catalog entity that lives in a `PostgreSQL` table.
///
/// Columns are named after the record's fields, so the generic store can
/// build statements from [`Entity::draft_fields`] and
/// [`Entity::patch_fields`] without per-table SQL.
pub trait PgRecord: Entity {
    /// Table holding this entity.
    const TABLE: &'static str;

    /// Decode one `SELECT *` / `RETURNING *` row.
    ///
    /// # Errors
    ///
    /// Returns [`sqlx::Error`] if a column is missing or has the wrong type.
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

/// Implements [`PgRecord`] by reading `id` plus each listed column.
/// Derived fields are not stored and decode as `None`.
macro_rules! pg_record {
    ($ty:ident => $table:literal { $($field:ident),* $(,)? } $(derived { $($derived:ident),* })?) => {
        impl PgRecord for $ty {
            const TABLE: &'static str = $table;

            fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
                Ok(Self {
                    id: row.try_get("id")?,
                    $( $field: row.try_get(stringify!($field))?, )*
                    $($( $derived: None, )*)?
                })
            }
        }
    };
}

pg_record!(Weapon => "weapons" {
    name, slot, weapon_type, min_damage, max_damage, effect_id,
} derived { effect });

pg_record!(Armour => "armour" { name, slot, armour_type, effect });

pg_record!(Jewellery => "jewellery" { name, jewellery_type, effect });

pg_record!(Effect => "effects" { name, description });

pg_record!(Feat => "feats" { name, description });

pg_record!(Attack => "attacks" { name, damage, weapon_requirement });

pg_record!(Creature => "creatures" {
    name,
    challenge_rating,
    attacks,
    classification,
    constitution,
    strength,
    intelligence,
    dexterity,
    charisma,
    wisdom,
    feat,
    hit_points,
    armour_class,
    speed,
});
