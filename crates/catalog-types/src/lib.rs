//! Shared type definitions for the game data catalog.
//!
//! Every catalog domain (weapons, armour, jewellery, effects, feats,
//! attacks, creatures) is the same shape: a stored **record** with a
//! store-assigned id, a **draft** used to create it, and a **patch** used to
//! partially update it. The [`Entity`] trait ties the three together so the
//! database tier, the service tier and the HTTP layer can be written once
//! and instantiated per domain.
//!
//! # Modules
//!
//! - [`entity`] -- the [`Entity`] / [`RecordId`] traits and [`FieldValue`]
//! - [`records`] -- the seven domain records and their drafts and patches
//! - [`envelope`] -- the `{Success, Message}` response envelope

pub mod entity;
pub mod envelope;
pub mod records;

pub use entity::{Entity, FieldValue, RecordId};
pub use envelope::Envelope;
pub use records::{
    Armour, ArmourDraft, ArmourPatch, Attack, AttackDraft, AttackPatch, Creature, CreatureDraft,
    CreaturePatch, Effect, EffectDraft, EffectPatch, Feat, FeatDraft, FeatPatch, Jewellery,
    JewelleryDraft, JewelleryPatch, Weapon, WeaponDraft, WeaponPatch,
};
