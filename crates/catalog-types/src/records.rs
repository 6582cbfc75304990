//! The seven catalog domains.
//!
//! Each domain is declared once through `define_entity!`, which emits the
//! stored record, its draft, its patch and the [`Entity`] implementation.
//! Wire names are `PascalCase` to match the public API
//! (`{"Name": "Sword", "MinDamage": 1, ...}`).
//!
//! Field kinds:
//! - `required` fields are always stored; the patch makes them optional.
//! - `optional` fields may be `null` in the store. A patch can set them but
//!   never clears them.
//! - `derived` fields exist only on the record, are never stored, and are
//!   filled in by the service tier (see the weapon's effect name).

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, FieldValue};

/// Generates a record, draft, patch and [`Entity`] impl for one domain.
macro_rules! define_entity {
    (
        $(#[$meta:meta])*
        $name:ident ($resource:literal) {
            id: $id_ty:ty,
            draft: $draft:ident,
            patch: $patch:ident,
            required {
                $( $(#[$r_meta:meta])* $r_field:ident : $r_ty:ty => $r_json:literal, )*
            }
            optional {
                $( $(#[$o_meta:meta])* $o_field:ident : $o_ty:ty => $o_json:literal, )*
            }
            derived {
                $( $(#[$d_meta:meta])* $d_field:ident : $d_ty:ty => $d_json:literal, )*
            }
        }
    ) => {
        $(#[$meta])*
        // Only some domains carry floats, so `Eq` cannot be derived uniformly.
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Store-assigned identifier.
            #[serde(rename = "Id")]
            pub id: $id_ty,
            $(
                $(#[$r_meta])*
                #[serde(rename = $r_json)]
                pub $r_field: $r_ty,
            )*
            $(
                $(#[$o_meta])*
                #[serde(rename = $o_json, default)]
                pub $o_field: Option<$o_ty>,
            )*
            $(
                $(#[$d_meta])*
                #[serde(rename = $d_json, default)]
                pub $d_field: Option<$d_ty>,
            )*
        }

        #[doc = concat!("Create payload for [`", stringify!($name), "`]. The store assigns the id.")]
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $draft {
            $(
                $(#[$r_meta])*
                #[serde(rename = $r_json)]
                pub $r_field: $r_ty,
            )*
            $(
                $(#[$o_meta])*
                #[serde(rename = $o_json, default)]
                pub $o_field: Option<$o_ty>,
            )*
        }

        #[doc = concat!("Partial update for [`", stringify!($name), "`]. Absent fields are left untouched.")]
        #[allow(clippy::derive_partial_eq_without_eq)]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $patch {
            /// Target record. The request path may supply it instead.
            #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
            pub id: Option<$id_ty>,
            $(
                $(#[$r_meta])*
                #[serde(rename = $r_json, default, skip_serializing_if = "Option::is_none")]
                pub $r_field: Option<$r_ty>,
            )*
            $(
                $(#[$o_meta])*
                #[serde(rename = $o_json, default, skip_serializing_if = "Option::is_none")]
                pub $o_field: Option<$o_ty>,
            )*
        }

        impl Entity for $name {
            type Id = $id_ty;
            type Draft = $draft;
            type Patch = $patch;

            const RESOURCE: &'static str = $resource;

            fn id(&self) -> &Self::Id {
                &self.id
            }

            fn from_draft(id: Self::Id, draft: Self::Draft) -> Self {
                Self {
                    id,
                    $( $r_field: draft.$r_field, )*
                    $( $o_field: draft.$o_field, )*
                    $( $d_field: None, )*
                }
            }

            fn apply_patch(&mut self, patch: &Self::Patch) {
                $(
                    if let Some(value) = &patch.$r_field {
                        self.$r_field = value.clone();
                    }
                )*
                $(
                    if let Some(value) = &patch.$o_field {
                        self.$o_field = Some(value.clone());
                    }
                )*
            }

            fn patch_id(patch: &Self::Patch) -> Option<&Self::Id> {
                patch.id.as_ref()
            }

            fn set_patch_id(patch: &mut Self::Patch, id: Self::Id) {
                patch.id = Some(id);
            }

            fn draft_fields(draft: &Self::Draft) -> Vec<(&'static str, FieldValue)> {
                vec![
                    $( (stringify!($r_field), FieldValue::from(draft.$r_field.clone())), )*
                    $( (stringify!($o_field), FieldValue::from(draft.$o_field.clone())), )*
                ]
            }

            fn field(&self, column: &str) -> Option<FieldValue> {
                $(
                    if column == stringify!($r_field) {
                        return Some(FieldValue::from(self.$r_field.clone()));
                    }
                )*
                $(
                    if column == stringify!($o_field) {
                        return Some(FieldValue::from(self.$o_field.clone()));
                    }
                )*
                None
            }

            fn patch_fields(patch: &Self::Patch) -> Vec<(&'static str, FieldValue)> {
                let mut fields = Vec::new();
                $(
                    if let Some(value) = &patch.$r_field {
                        fields.push((stringify!($r_field), FieldValue::from(value.clone())));
                    }
                )*
                $(
                    if let Some(value) = &patch.$o_field {
                        fields.push((stringify!($o_field), FieldValue::from(Some(value.clone()))));
                    }
                )*
                fields
            }
        }
    };
}

define_entity! {
    /// A wieldable weapon. `effect_id` optionally references an [`Effect`].
    Weapon("Weapon") {
        id: i32,
        draft: WeaponDraft,
        patch: WeaponPatch,
        required {
            /// Display name.
            name: String => "Name",
            /// Equipment slot (e.g. `MainHand`).
            slot: String => "Slot",
            /// Weapon category (e.g. `Melee`).
            weapon_type: String => "Type",
            /// Lower damage bound.
            min_damage: i32 => "MinDamage",
            /// Upper damage bound.
            max_damage: i32 => "MaxDamage",
        }
        optional {
            /// Id of the effect this weapon applies.
            effect_id: i32 => "EffectId",
        }
        derived {
            /// Name of the referenced effect, resolved by the service tier.
            /// `None` when there is no reference, `Some("")` when the
            /// reference could not be resolved.
            effect: String => "Effect",
        }
    }
}

define_entity! {
    /// A piece of armour.
    Armour("Armour") {
        id: i32,
        draft: ArmourDraft,
        patch: ArmourPatch,
        required {
            /// Display name.
            name: String => "Name",
            /// Equipment slot.
            slot: String => "Slot",
            /// Armour category.
            armour_type: String => "Type",
        }
        optional {
            /// Free-text effect description.
            effect: String => "Effect",
        }
        derived {}
    }
}

define_entity! {
    /// A piece of jewellery.
    Jewellery("Jewellery") {
        id: i32,
        draft: JewelleryDraft,
        patch: JewelleryPatch,
        required {
            /// Display name.
            name: String => "Name",
            /// Jewellery category.
            jewellery_type: String => "Type",
        }
        optional {
            /// Free-text effect description.
            effect: String => "Effect",
        }
        derived {}
    }
}

define_entity! {
    /// A named effect, referenced by weapons.
    Effect("Effect") {
        id: i32,
        draft: EffectDraft,
        patch: EffectPatch,
        required {
            /// Display name.
            name: String => "Name",
            /// Rules text.
            description: String => "Description",
        }
        optional {}
        derived {}
    }
}

define_entity! {
    /// A feat.
    Feat("Feat") {
        id: i32,
        draft: FeatDraft,
        patch: FeatPatch,
        required {
            /// Display name.
            name: String => "Name",
            /// Rules text.
            description: String => "Description",
        }
        optional {}
        derived {}
    }
}

define_entity! {
    /// An attack.
    Attack("Attack") {
        id: i32,
        draft: AttackDraft,
        patch: AttackPatch,
        required {
            /// Display name.
            name: String => "Name",
            /// Damage dealt.
            damage: i32 => "Damage",
            /// Weapon needed to perform the attack.
            weapon_requirement: String => "WeaponRequirement",
        }
        optional {}
        derived {}
    }
}

define_entity! {
    /// A creature stat block. Creatures use string ids.
    Creature("Creature") {
        id: String,
        draft: CreatureDraft,
        patch: CreaturePatch,
        required {
            /// Display name.
            name: String => "Name",
            /// Challenge rating.
            challenge_rating: f32 => "ChallengeRating",
            /// Attack list, free text.
            attacks: String => "Attacks",
            /// Creature classification.
            classification: String => "Classification",
            /// Constitution score.
            constitution: i32 => "Con",
            /// Strength score.
            strength: i32 => "Str",
            /// Intelligence score.
            intelligence: i32 => "Int",
            /// Dexterity score.
            dexterity: i32 => "Dex",
            /// Charisma score.
            charisma: i32 => "Cha",
            /// Wisdom score.
            wisdom: i32 => "Wis",
            /// Feat list, free text.
            feat: String => "Feat",
            /// Hit points.
            hit_points: i32 => "HP",
            /// Armour class.
            armour_class: i32 => "AC",
            /// Movement speed.
            speed: i32 => "Speed",
        }
        optional {}
        derived {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sword_draft() -> WeaponDraft {
        WeaponDraft {
            name: String::from("Sword"),
            slot: String::from("MainHand"),
            weapon_type: String::from("Melee"),
            min_damage: 1,
            max_damage: 5,
            effect_id: None,
        }
    }

    #[test]
    fn weapon_wire_names_are_pascal_case() {
        let draft: Result<WeaponDraft, _> = serde_json::from_value(serde_json::json!({
            "Name": "Sword",
            "Slot": "MainHand",
            "Type": "Melee",
            "MinDamage": 1,
            "MaxDamage": 5
        }));
        assert_eq!(draft.ok(), Some(sword_draft()));
    }

    #[test]
    fn draft_becomes_record_with_unresolved_effect() {
        let weapon = Weapon::from_draft(3, sword_draft());
        assert_eq!(weapon.id, 3);
        assert_eq!(weapon.effect, None);
        assert_eq!(weapon.name, "Sword");
    }

    #[test]
    fn patch_only_overwrites_present_fields() {
        let mut weapon = Weapon::from_draft(1, sword_draft());
        let patch = WeaponPatch {
            max_damage: Some(9),
            effect_id: Some(4),
            ..WeaponPatch::default()
        };
        weapon.apply_patch(&patch);

        assert_eq!(weapon.max_damage, 9);
        assert_eq!(weapon.effect_id, Some(4));
        assert_eq!(weapon.min_damage, 1);
        assert_eq!(weapon.slot, "MainHand");
    }

    #[test]
    fn patch_fields_lists_only_present_fields() {
        let patch = WeaponPatch {
            id: Some(1),
            name: Some(String::from("Axe")),
            ..WeaponPatch::default()
        };
        let fields = Weapon::patch_fields(&patch);
        assert_eq!(
            fields,
            vec![("name", FieldValue::Text(Some(String::from("Axe"))))]
        );
    }

    #[test]
    fn field_reads_stored_columns_by_name() {
        let weapon = Weapon::from_draft(1, sword_draft());
        assert_eq!(
            weapon.field("weapon_type"),
            Some(FieldValue::Text(Some(String::from("Melee"))))
        );
        assert_eq!(weapon.field("effect_id"), Some(FieldValue::Int(None)));
        assert_eq!(weapon.field("effect"), None);
    }

    #[test]
    fn patch_serializes_without_absent_fields() {
        let patch = ArmourPatch {
            id: Some(2),
            slot: Some(String::from("Chest")),
            ..ArmourPatch::default()
        };
        let json = serde_json::to_value(&patch).ok();
        assert_eq!(json, Some(serde_json::json!({"Id": 2, "Slot": "Chest"})));
    }

    #[test]
    fn draft_fields_cover_every_stored_column() {
        let columns: Vec<&str> = Weapon::draft_fields(&sword_draft())
            .into_iter()
            .map(|(column, _)| column)
            .collect();
        assert_eq!(
            columns,
            vec![
                "name",
                "slot",
                "weapon_type",
                "min_damage",
                "max_damage",
                "effect_id"
            ]
        );
    }

    #[test]
    fn creature_uses_stat_block_abbreviations() {
        let json = serde_json::json!({
            "Id": "abc",
            "Name": "Goblin",
            "ChallengeRating": 0.25,
            "Attacks": "Scimitar",
            "Classification": "Humanoid",
            "Con": 10, "Str": 8, "Int": 10, "Dex": 14, "Cha": 8, "Wis": 8,
            "Feat": "Nimble Escape",
            "HP": 7, "AC": 15, "Speed": 30
        });
        let creature: Option<Creature> = serde_json::from_value(json).ok();
        assert_eq!(creature.as_ref().map(|c| c.hit_points), Some(7));
        assert_eq!(creature.map(|c| c.id), Some(String::from("abc")));
    }
}
