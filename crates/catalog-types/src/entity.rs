//! The generic entity abstraction shared by every catalog domain.
//!
//! Field names returned by [`Entity::draft_fields`] and
//! [`Entity::patch_fields`] are the Rust field names, which the database
//! tier also uses as column names.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// A single typed column value, used to bind parameters without string
/// interpolation.
///
/// Each variant carries an `Option` so that absent optional fields bind as
/// a typed `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A 32-bit integer column.
    Int(Option<i32>),
    /// A single-precision float column.
    Float(Option<f32>),
    /// A text column.
    Text(Option<String>),
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(Some(value))
    }
}

impl From<Option<i32>> for FieldValue {
    fn from(value: Option<i32>) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        Self::Float(Some(value))
    }
}

impl From<Option<f32>> for FieldValue {
    fn from(value: Option<f32>) -> Self {
        Self::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(Some(value))
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        Self::Text(value)
    }
}

/// An opaque, store-assigned record identifier.
///
/// Integer ids back the relational domains; string ids back the
/// document-style creature domain.
pub trait RecordId:
    Clone
    + Debug
    + Display
    + FromStr
    + PartialEq
    + Eq
    + Hash
    + Ord
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Allocate a fresh id for an in-process store from its monotonic
    /// sequence number. Returns `None` when the sequence no longer fits.
    fn allocate(sequence: u64) -> Option<Self>;

    /// The id as a bindable column value.
    fn to_field(&self) -> FieldValue;
}

impl RecordId for i32 {
    fn allocate(sequence: u64) -> Option<Self> {
        Self::try_from(sequence).ok()
    }

    fn to_field(&self) -> FieldValue {
        FieldValue::Int(Some(*self))
    }
}

impl RecordId for String {
    fn allocate(_sequence: u64) -> Option<Self> {
        Some(Uuid::now_v7().simple().to_string())
    }

    fn to_field(&self) -> FieldValue {
        FieldValue::Text(Some(self.clone()))
    }
}

/// A catalog entity: one record type with its create and update payloads.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Identifier type assigned by the store.
    type Id: RecordId;
    /// Create payload (every stored field, no id).
    type Draft: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    /// Partial update payload (every field optional).
    type Patch: Clone + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Resource name used as the HTTP path segment (e.g. `Weapon`).
    const RESOURCE: &'static str;

    /// The record's id.
    fn id(&self) -> &Self::Id;

    /// Build a stored record from a draft and its newly assigned id.
    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    /// Overwrite only the fields present in `patch`.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// The id a patch targets, if it carries one.
    fn patch_id(patch: &Self::Patch) -> Option<&Self::Id>;

    /// Point a patch at `id`, replacing any id it already carries.
    fn set_patch_id(patch: &mut Self::Patch, id: Self::Id);

    /// Every stored field of a draft, in declaration order.
    fn draft_fields(draft: &Self::Draft) -> Vec<(&'static str, FieldValue)>;

    /// The stored value of `column`, or `None` for an unknown column.
    fn field(&self, column: &str) -> Option<FieldValue>;

    /// Only the fields present in a patch, in declaration order.
    fn patch_fields(patch: &Self::Patch) -> Vec<(&'static str, FieldValue)>;
}
