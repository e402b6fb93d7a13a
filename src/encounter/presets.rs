//! Built-in enemy and dungeon content.

use super::provider::EncounterSource;
use super::types::{DungeonDefinition, EnemyDefinition, Wave};
use crate::combat::buff::{BuffDefinition, StatModifiers};
use crate::combat::skill::{EnemySkillDefinition, SkillEffect, SkillTrigger};
use crate::core::constants::DEFAULT_ENEMY_RESPAWN_SECONDS;

pub fn meadow_boar() -> EnemyDefinition {
    EnemyDefinition {
        id: "meadow_boar".to_string(),
        name: "Meadow Boar".to_string(),
        max_hp: 60.0,
        damage: 4.0,
        attack_interval: 2.5,
        threat_weight: 1.0,
        skills: Vec::new(),
    }
}

pub fn forest_wolf() -> EnemyDefinition {
    EnemyDefinition {
        id: "forest_wolf".to_string(),
        name: "Forest Wolf".to_string(),
        max_hp: 45.0,
        damage: 6.0,
        attack_interval: 1.8,
        threat_weight: 1.5,
        skills: vec![EnemySkillDefinition {
            id: "lunge".to_string(),
            cooldown: 7.0,
            trigger: SkillTrigger::Always,
            effect: SkillEffect::Strike { multiplier: 1.8 },
            chance: 0.5,
        }],
    }
}

pub fn cave_troll() -> EnemyDefinition {
    EnemyDefinition {
        id: "cave_troll".to_string(),
        name: "Cave Troll".to_string(),
        max_hp: 220.0,
        damage: 12.0,
        attack_interval: 3.2,
        threat_weight: 2.0,
        skills: vec![EnemySkillDefinition {
            id: "troll_rage".to_string(),
            cooldown: 6.0,
            trigger: SkillTrigger::HpBelow(0.5),
            effect: SkillEffect::ApplyBuff(enemy_enrage()),
            chance: 1.0,
        }],
    }
}

pub fn crypt_lord() -> EnemyDefinition {
    EnemyDefinition {
        id: "crypt_lord".to_string(),
        name: "Crypt Lord".to_string(),
        max_hp: 600.0,
        damage: 18.0,
        attack_interval: 3.0,
        threat_weight: 3.0,
        skills: vec![
            EnemySkillDefinition {
                id: "grave_strike".to_string(),
                cooldown: 9.0,
                trigger: SkillTrigger::Always,
                effect: SkillEffect::Strike { multiplier: 2.5 },
                chance: 1.0,
            },
            EnemySkillDefinition {
                id: "unholy_mending".to_string(),
                cooldown: 15.0,
                trigger: SkillTrigger::HpBelow(0.3),
                effect: SkillEffect::Heal { fraction: 0.15 },
                chance: 0.75,
            },
        ],
    }
}

pub fn enemy_enrage() -> BuffDefinition {
    BuffDefinition {
        id: "enemy_enrage".to_string(),
        duration: 10.0,
        max_stacks: 3,
        per_stack: StatModifiers {
            damage_multiplier_physical: 0.25,
            ..Default::default()
        },
    }
}

pub fn sunken_crypt() -> DungeonDefinition {
    DungeonDefinition {
        id: "sunken_crypt".to_string(),
        name: "Sunken Crypt".to_string(),
        waves: vec![
            Wave {
                enemies: vec![forest_wolf(), forest_wolf(), meadow_boar()],
            },
            Wave {
                enemies: vec![cave_troll(), forest_wolf()],
            },
            Wave {
                enemies: vec![crypt_lord()],
            },
        ],
        wave_respawn_delay: 3.0,
        run_respawn_delay: 15.0,
        auto_revive: true,
        drop_multiplier: 1.0,
        reset_on_death: false,
        max_runs: None,
    }
}

/// Enhanced mode: higher drops, but a death restarts the run.
pub fn sunken_crypt_enhanced() -> DungeonDefinition {
    DungeonDefinition {
        id: "sunken_crypt_enhanced".to_string(),
        name: "Sunken Crypt (Enhanced)".to_string(),
        drop_multiplier: 2.0,
        reset_on_death: true,
        ..sunken_crypt()
    }
}

pub const PRESET_NAMES: [&str; 5] = [
    "meadow_boar",
    "forest_wolf",
    "cave_troll",
    "sunken_crypt",
    "sunken_crypt_enhanced",
];

/// Encounter source for a preset name, as used by the simulator CLI.
pub fn preset_source(name: &str) -> Option<EncounterSource> {
    let single = |enemy: EnemyDefinition| {
        Some(EncounterSource::single(
            vec![enemy],
            DEFAULT_ENEMY_RESPAWN_SECONDS,
        ))
    };
    match name {
        "meadow_boar" => single(meadow_boar()),
        "forest_wolf" => single(forest_wolf()),
        "cave_troll" => single(cave_troll()),
        "sunken_crypt" => Some(EncounterSource::dungeon(sunken_crypt())),
        "sunken_crypt_enhanced" => Some(EncounterSource::dungeon(sunken_crypt_enhanced())),
        _ => None,
    }
}
