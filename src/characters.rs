// characters.rs - The fixed rosters and their runtime records.
//
// Students and professors are tagged variants (enums) with stat tables as
// small pure functions, not an inheritance tree. Archetype-specific combat
// behavior (crit chance, heal doubling, the curve save) is dispatched off the
// tag in combat.rs.

use bevy::prelude::*;

/// How many heals a student starts a run with. Never replenished mid-run.
pub const STARTING_HEALS: u32 = 3;

/// The three playable students.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Archetype {
    CsGetDegrees,
    Medallion,
    TaGod,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::CsGetDegrees, Archetype::Medallion, Archetype::TaGod];

    pub fn display_name(self) -> &'static str {
        match self {
            Archetype::CsGetDegrees => "Cs Get Degrees",
            Archetype::Medallion => "4.0 Medallion",
            Archetype::TaGod => "TA God",
        }
    }

    pub fn ability_description(self) -> &'static str {
        match self {
            Archetype::CsGetDegrees => {
                "Hidden Ability: 25% chance to ignore a wrong answer on a dodge."
            }
            Archetype::Medallion => {
                "Special: 20% Critical Hit chance (The Curve) for 1.5x damage."
            }
            Archetype::TaGod => "Special: Healing restores twice as much HP (Lab Snacks).",
        }
    }

    pub fn win_message(self) -> &'static str {
        match self {
            Archetype::CsGetDegrees => "C's Really Do Get Degrees! You passed!",
            Archetype::Medallion => "Academic Excellence!",
            Archetype::TaGod => "The lab is yours now!",
        }
    }

    pub fn max_hp(self) -> i32 {
        100
    }

    pub fn attack_power(self) -> i32 {
        match self {
            Archetype::CsGetDegrees => 15,
            Archetype::Medallion => 20,
            Archetype::TaGod => 18,
        }
    }

    pub fn crit_chance(self) -> f32 {
        match self {
            Archetype::Medallion => 0.20,
            _ => 0.05,
        }
    }

    pub fn sprite(self) -> CharacterId {
        match self {
            Archetype::CsGetDegrees => CharacterId::Swi,
            Archetype::Medallion => CharacterId::Kris,
            Archetype::TaGod => CharacterId::Ken,
        }
    }
}

/// The three professors, in hallway order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossKind {
    Sridhar,
    Diochnos,
    Maiti,
}

impl BossKind {
    pub const ALL: [BossKind; 3] = [BossKind::Sridhar, BossKind::Diochnos, BossKind::Maiti];

    /// Door/level index (0-based) to boss.
    pub fn from_level(level: usize) -> BossKind {
        BossKind::ALL[level.min(BossKind::ALL.len() - 1)]
    }

    /// Join key to the question bank and to boss-specific audio.
    pub fn boss_id(self) -> u8 {
        match self {
            BossKind::Sridhar => 1,
            BossKind::Diochnos => 2,
            BossKind::Maiti => 3,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BossKind::Sridhar => "Prof Sridhar",
            BossKind::Diochnos => "Prof Diochnos",
            BossKind::Maiti => "Prof Maiti",
        }
    }

    pub fn level_name(self) -> &'static str {
        match self {
            BossKind::Sridhar => "The Biz",
            BossKind::Diochnos => "Turing Machine Terrace",
            BossKind::Maiti => "Bitcoin Boulevard",
        }
    }

    pub fn loss_message(self) -> &'static str {
        match self {
            BossKind::Sridhar => "Logic is not O(1). You fail Data Structures.",
            BossKind::Diochnos => "This language is not decidable... and neither are you. You fail Theory.",
            BossKind::Maiti => "Your hash has collisions. You fail Cryptography.",
        }
    }

    pub fn max_hp(self) -> i32 {
        match self {
            BossKind::Sridhar => 150,
            BossKind::Diochnos => 200,
            BossKind::Maiti => 275,
        }
    }

    pub fn attack_power(self) -> i32 {
        35
    }

    pub fn sprite(self) -> CharacterId {
        match self {
            BossKind::Sridhar => CharacterId::Sridhar,
            BossKind::Diochnos => CharacterId::Dioch,
            BossKind::Maiti => CharacterId::Maiti,
        }
    }
}

/// Key into the sprite library; one per drawable character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharacterId {
    Swi,
    Kris,
    Ken,
    Sridhar,
    Dioch,
    Maiti,
}

impl CharacterId {
    pub const ALL: [CharacterId; 6] = [
        CharacterId::Swi,
        CharacterId::Kris,
        CharacterId::Ken,
        CharacterId::Sridhar,
        CharacterId::Dioch,
        CharacterId::Maiti,
    ];

    /// Folder name under assets/sprites/.
    pub fn folder(self) -> &'static str {
        match self {
            CharacterId::Swi => "swi",
            CharacterId::Kris => "kris",
            CharacterId::Ken => "ken",
            CharacterId::Sridhar => "sridhar",
            CharacterId::Dioch => "dioch",
            CharacterId::Maiti => "maiti",
        }
    }
}

/// Runtime record for the chosen student. Lives in GameRun for the whole run;
/// HP is restored between battles, remaining_heals is not.
#[derive(Clone, Debug)]
pub struct Student {
    pub archetype: Archetype,
    pub hp: i32,
    pub remaining_heals: u32,
}

impl Student {
    pub fn new(archetype: Archetype) -> Self {
        Student {
            archetype,
            hp: archetype.max_hp(),
            remaining_heals: STARTING_HEALS,
        }
    }

    pub fn max_hp(&self) -> i32 {
        self.archetype.max_hp()
    }
}

/// Runtime record for the professor in the active battle. Rebuilt at full HP
/// on every battle entry.
#[derive(Clone, Debug)]
pub struct Professor {
    pub kind: BossKind,
    pub hp: i32,
}

impl Professor {
    pub fn new(kind: BossKind) -> Self {
        Professor {
            kind,
            hp: kind.max_hp(),
        }
    }

    pub fn max_hp(&self) -> i32 {
        self.kind.max_hp()
    }
}

/// Marker for the player's sprite entity in whichever scene is active.
#[derive(Component)]
pub struct PlayerSprite;

/// Marker for the boss sprite entity during battle.
#[derive(Component)]
pub struct BossSprite;
