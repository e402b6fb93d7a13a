use crate::combat::skill::EnemySkillDefinition;
use crate::combat::types::Vitals;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static enemy template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: String,
    pub name: String,
    pub max_hp: f64,
    pub damage: f64,
    pub attack_interval: f64,
    #[serde(default = "default_threat_weight")]
    pub threat_weight: f64,
    #[serde(default)]
    pub skills: Vec<EnemySkillDefinition>,
}

fn default_threat_weight() -> f64 {
    1.0
}

impl EnemyDefinition {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_hp > 0.0) {
            return Err(format!("{}: max_hp must be positive", self.id));
        }
        if !(self.damage >= 0.0) {
            return Err(format!("{}: damage must be non-negative", self.id));
        }
        if !(self.attack_interval > 0.0) {
            return Err(format!("{}: attack_interval must be positive", self.id));
        }
        if !(self.threat_weight >= 0.0) {
            return Err(format!("{}: threat_weight must be non-negative", self.id));
        }
        for skill in &self.skills {
            if !(skill.cooldown > 0.0) {
                return Err(format!("{}: skill {} needs a positive cooldown", self.id, skill.id));
            }
            if !(0.0..=1.0).contains(&skill.chance) {
                return Err(format!("{}: skill {} chance out of range", self.id, skill.id));
            }
        }
        Ok(())
    }
}

/// Identity of one spawned enemy: which spawn it came from and its slot in it.
///
/// `wave_serial` increases with every spawn, so ids never repeat across waves
/// or runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncounterId {
    pub wave_serial: u64,
    pub slot: u32,
}

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}#{}", self.wave_serial, self.slot)
    }
}

/// HP-bearing instance of an [`EnemyDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: EncounterId,
    pub definition: EnemyDefinition,
    pub vitals: Vitals,
}

impl Encounter {
    pub fn new(id: EncounterId, definition: EnemyDefinition) -> Self {
        let vitals = Vitals::new(definition.max_hp);
        Self {
            id,
            definition,
            vitals,
        }
    }
}

/// The enemies of one spawned wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterGroup {
    pub wave_index: usize,
    pub wave_serial: u64,
    pub encounters: Vec<Encounter>,
}

impl EncounterGroup {
    pub fn new(wave_index: usize, wave_serial: u64, definitions: &[EnemyDefinition]) -> Self {
        let encounters = definitions
            .iter()
            .enumerate()
            .map(|(slot, definition)| {
                Encounter::new(
                    EncounterId {
                        wave_serial,
                        slot: slot as u32,
                    },
                    definition.clone(),
                )
            })
            .collect();
        Self {
            wave_index,
            wave_serial,
            encounters,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.encounters.iter().all(|e| !e.vitals.is_alive())
    }

    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub enemies: Vec<EnemyDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonDefinition {
    pub id: String,
    pub name: String,
    pub waves: Vec<Wave>,
    /// Delay between clearing a wave and the next one spawning
    pub wave_respawn_delay: f64,
    /// Delay between finishing the last wave and wave 0 of the next run
    pub run_respawn_delay: f64,
    pub auto_revive: bool,
    #[serde(default = "default_drop_multiplier")]
    pub drop_multiplier: f64,
    /// Enhanced mode: a player death rewinds the run to wave 0
    #[serde(default)]
    pub reset_on_death: bool,
    #[serde(default)]
    pub max_runs: Option<u32>,
}

fn default_drop_multiplier() -> f64 {
    1.0
}

impl DungeonDefinition {
    pub fn validate(&self) -> Result<(), String> {
        if self.waves.is_empty() {
            return Err(format!("dungeon {} has no waves", self.id));
        }
        for (index, wave) in self.waves.iter().enumerate() {
            if wave.enemies.is_empty() {
                return Err(format!("dungeon {} wave {} has no enemies", self.id, index));
            }
            for enemy in &wave.enemies {
                enemy.validate()?;
            }
        }
        if !(self.wave_respawn_delay >= 0.0) || !(self.run_respawn_delay >= 0.0) {
            return Err(format!("dungeon {} has a negative respawn delay", self.id));
        }
        if !(self.drop_multiplier >= 0.0) {
            return Err(format!("dungeon {} has a negative drop multiplier", self.id));
        }
        if self.max_runs == Some(0) {
            return Err(format!("dungeon {} allows zero runs", self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat() -> EnemyDefinition {
        EnemyDefinition {
            id: "rat".to_string(),
            name: "Rat".to_string(),
            max_hp: 10.0,
            damage: 1.0,
            attack_interval: 2.0,
            threat_weight: 1.0,
            skills: Vec::new(),
        }
    }

    #[test]
    fn test_group_assigns_slots_under_serial() {
        let group = EncounterGroup::new(1, 7, &[rat(), rat(), rat()]);
        let ids: Vec<String> = group.encounters.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["w7#0", "w7#1", "w7#2"]);
        assert!(!group.is_cleared());
    }

    #[test]
    fn test_group_cleared_when_all_dead() {
        let mut group = EncounterGroup::new(0, 1, &[rat(), rat()]);
        for encounter in &mut group.encounters {
            encounter.vitals.receive_damage(100.0, 1.0);
        }
        assert!(group.is_cleared());
    }

    #[test]
    fn test_enemy_definition_defaults() {
        let json = r#"{"id":"x","name":"X","max_hp":5.0,"damage":1.0,"attack_interval":1.0}"#;
        let def: EnemyDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.threat_weight, 1.0);
        assert!(def.skills.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_enemy() {
        let mut def = rat();
        def.attack_interval = 0.0;
        assert!(def.validate().is_err());
        let mut def = rat();
        def.threat_weight = -1.0;
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_dungeon_validate_rejects_empty_wave() {
        let dungeon = DungeonDefinition {
            id: "d".to_string(),
            name: "D".to_string(),
            waves: vec![Wave { enemies: vec![] }],
            wave_respawn_delay: 1.0,
            run_respawn_delay: 1.0,
            auto_revive: true,
            drop_multiplier: 1.0,
            reset_on_death: false,
            max_runs: None,
        };
        assert!(dungeon.validate().is_err());
    }
}
