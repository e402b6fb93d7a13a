//! Enemy skills, each driven by its own cooldown track.

use super::buff::BuffDefinition;
use super::track::{Track, TrackKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SkillTrigger {
    Always,
    /// Only casts while HP fraction is strictly below the threshold
    HpBelow(f64),
}

impl SkillTrigger {
    pub fn is_met(&self, hp_fraction: f64) -> bool {
        match self {
            SkillTrigger::Always => true,
            SkillTrigger::HpBelow(threshold) => hp_fraction < *threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Hit the player for `multiplier` times the enemy's base damage
    Strike { multiplier: f64 },
    /// Apply a buff to the caster
    ApplyBuff(BuffDefinition),
    /// Restore a fraction of max HP
    Heal { fraction: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySkillDefinition {
    pub id: String,
    pub cooldown: f64,
    pub trigger: SkillTrigger,
    pub effect: SkillEffect,
    /// Activation chance in [0, 1]; below 1 costs one RNG draw per attempt
    #[serde(default = "default_chance")]
    pub chance: f64,
}

fn default_chance() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSlot {
    pub definition: EnemySkillDefinition,
    pub track: Track,
}

/// Pending cast produced when slots (re)start: `(slot, next_at, generation)`.
pub type SkillStart = (usize, f64, u64);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillManager {
    slots: Vec<SkillSlot>,
}

impl SkillManager {
    pub fn new(definitions: &[EnemySkillDefinition]) -> Self {
        let slots = definitions
            .iter()
            .map(|definition| {
                assert!(
                    (0.0..=1.0).contains(&definition.chance),
                    "skill chance out of range: {}",
                    definition.chance
                );
                SkillSlot {
                    definition: definition.clone(),
                    track: Track::new(TrackKind::Special, definition.cooldown),
                }
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[SkillSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SkillSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut SkillSlot> {
        self.slots.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Start every paused slot one cooldown from `now`.
    pub fn resume_all(&mut self, now: f64) -> Vec<SkillStart> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.track
                    .resume(now, false)
                    .map(|next_at| (index, next_at, slot.track.generation()))
            })
            .collect()
    }

    pub fn pause_all(&mut self) {
        for slot in &mut self.slots {
            slot.track.pause();
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for slot in &self.slots {
            if !(0.0..=1.0).contains(&slot.definition.chance) {
                return Err(format!("skill {} chance out of range", slot.definition.id));
            }
            slot.track
                .validate()
                .map_err(|e| format!("skill {}: {}", slot.definition.id, e))?;
        }
        Ok(())
    }
}
