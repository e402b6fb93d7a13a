//! Character profile consumed by the battle engine.

use super::profession::ProfessionId;
use crate::core::constants::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub attack_power: f64,
    /// Chance in [0, 1]
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    /// 10.0 = attacks come 10% faster
    pub haste_percent: f64,
    pub stamina: f64,
    pub armor: f64,
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            attack_power: 10.0,
            crit_chance: 0.05,
            crit_multiplier: 1.5,
            haste_percent: 0.0,
            stamina: 10.0,
            armor: 0.0,
        }
    }
}

impl CharacterStats {
    /// Max HP = BASE_PLAYER_HP + stamina × HP_PER_STAMINA
    pub fn max_hp(&self) -> f64 {
        (BASE_PLAYER_HP + self.stamina * HP_PER_STAMINA).max(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub id: Uuid,
    pub name: String,
    pub profession: ProfessionId,
    pub stats: CharacterStats,
}

impl CharacterProfile {
    pub fn new(name: impl Into<String>, profession: ProfessionId, stats: CharacterStats) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            profession,
            stats,
        }
    }

    /// Same as [`CharacterProfile::new`] with a caller-chosen id, for
    /// profiles loaded from storage.
    pub fn with_id(
        id: Uuid,
        name: impl Into<String>,
        profession: ProfessionId,
        stats: CharacterStats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            profession,
            stats,
        }
    }
}

/// Validates character stats before a battle is built from them.
pub fn validate_stats(stats: &CharacterStats) -> Result<(), String> {
    if !(stats.attack_power >= 0.0) {
        return Err(format!("attack_power must be non-negative, got {}", stats.attack_power));
    }
    if !(0.0..=1.0).contains(&stats.crit_chance) {
        return Err(format!("crit_chance must be in [0, 1], got {}", stats.crit_chance));
    }
    if !(stats.crit_multiplier >= 1.0) {
        return Err(format!(
            "crit_multiplier must be at least 1, got {}",
            stats.crit_multiplier
        ));
    }
    if !(stats.stamina >= 0.0) || !(stats.armor >= 0.0) {
        return Err("stamina and armor must be non-negative".to_string());
    }
    if !stats.haste_percent.is_finite() {
        return Err("haste_percent must be finite".to_string());
    }
    Ok(())
}
