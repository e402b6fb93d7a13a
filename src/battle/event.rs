//! The closed set of events a battle schedules.

use super::handlers::BattleContext;
use crate::core::error::Result;
use crate::encounter::types::EncounterId;
use serde::{Deserialize, Serialize};

/// Track-driven events carry the generation of the track that queued them;
/// a mismatch on execution means the track was paused or restarted since,
/// and the event is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    AttackTick {
        generation: u64,
    },
    SpecialPulse {
        generation: u64,
    },
    EnemyAttack {
        enemy: EncounterId,
        generation: u64,
    },
    EnemySkillCast {
        enemy: EncounterId,
        slot: usize,
        generation: u64,
    },
    PlayerDeath,
    PlayerRevive,
    WaveSpawn {
        wave_serial: u64,
    },
}

impl BattleEvent {
    /// Run the event. `Ok(false)` means it was stale and changed nothing.
    pub fn execute(self, ctx: &mut BattleContext<'_>) -> Result<bool> {
        match self {
            BattleEvent::AttackTick { generation } => ctx.on_attack_tick(generation),
            BattleEvent::SpecialPulse { generation } => ctx.on_special_pulse(generation),
            BattleEvent::EnemyAttack { enemy, generation } => {
                ctx.on_enemy_attack(enemy, generation)
            }
            BattleEvent::EnemySkillCast {
                enemy,
                slot,
                generation,
            } => ctx.on_enemy_skill_cast(enemy, slot, generation),
            BattleEvent::PlayerDeath => ctx.on_player_death(),
            BattleEvent::PlayerRevive => ctx.on_player_revive(),
            BattleEvent::WaveSpawn { wave_serial } => ctx.on_wave_spawn(wave_serial),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BattleEvent::AttackTick { .. } => "attack_tick",
            BattleEvent::SpecialPulse { .. } => "special_pulse",
            BattleEvent::EnemyAttack { .. } => "enemy_attack",
            BattleEvent::EnemySkillCast { .. } => "enemy_skill_cast",
            BattleEvent::PlayerDeath => "player_death",
            BattleEvent::PlayerRevive => "player_revive",
            BattleEvent::WaveSpawn { .. } => "wave_spawn",
        }
    }
}
