//! Class modifier table
//!
//! One static row per character class. The table is constant input to the
//! stat deriver and can be replaced wholesale from the `[[classes]]` array
//! of a config file.

use serde::{Deserialize, Serialize};

/// Character classes known to the modifier table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Warrior,
    Ranger,
    Mage,
    Rogue,
    Cleric,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 5] = [
        CharacterClass::Warrior,
        CharacterClass::Ranger,
        CharacterClass::Mage,
        CharacterClass::Rogue,
        CharacterClass::Cleric,
    ];
}

/// Additive modifiers contributed by a class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassModifier {
    pub class: CharacterClass,
    pub accuracy: i32,
    pub damage: i32,
    pub range: i32,
    pub mobility: i32,
    pub defense: i32,
    pub action_points: u32,
    #[serde(default)]
    pub specialties: Vec<String>,
}

impl ClassModifier {
    fn row(
        class: CharacterClass,
        [accuracy, damage, range, mobility, defense]: [i32; 5],
        action_points: u32,
        specialties: &[&str],
    ) -> Self {
        Self {
            class,
            accuracy,
            damage,
            range,
            mobility,
            defense,
            action_points,
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Row used for a class missing from a custom table
    pub fn neutral(class: CharacterClass) -> Self {
        Self::row(class, [0, 0, 1, 0, 0], 6, &[])
    }
}

/// Lookup table from class to modifier row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassModifierTable {
    rows: Vec<ClassModifier>,
}

impl Default for ClassModifierTable {
    fn default() -> Self {
        use CharacterClass::*;
        Self {
            rows: vec![
                ClassModifier::row(Warrior, [0, 8, 1, 0, 6], 6, &["shield_wall", "cleave"]),
                ClassModifier::row(Ranger, [15, 4, 6, 1, 0], 6, &["volley", "track"]),
                ClassModifier::row(Mage, [10, 12, 5, -1, -2], 5, &["fireball", "ward"]),
                ClassModifier::row(Rogue, [8, 6, 1, 2, 1], 7, &["backstab", "evade"]),
                ClassModifier::row(Cleric, [5, 2, 3, 0, 4], 5, &["heal", "bless"]),
            ],
        }
    }
}

impl ClassModifierTable {
    pub fn new(rows: Vec<ClassModifier>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ClassModifier] {
        &self.rows
    }

    pub fn get(&self, class: CharacterClass) -> Option<&ClassModifier> {
        self.rows.iter().find(|r| r.class == class)
    }
}
