//! Everything a battle needs to resume: the unit that gets snapshotted.

use super::event::BattleEvent;
use super::segment::SegmentCollector;
use crate::combat::combatant::{EnemyCombatant, PlayerCombatant};
use crate::core::clock::GameClock;
use crate::core::config::CombatLoopOptions;
use crate::core::rng::RngContext;
use crate::core::scheduler::EventScheduler;
use crate::encounter::provider::{EncounterProvider, EncounterSource};
use crate::encounter::types::EncounterGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Running totals over the whole battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleTotals {
    pub damage_dealt: f64,
    pub damage_taken: f64,
    pub kills: u64,
    pub deaths: u64,
    pub revives: u64,
    pub waves_cleared: u64,
    pub runs_completed: u64,
    pub dungeon_resets: u64,
    pub events_processed: u64,
    /// Kills weighted by the provider's drop multiplier, for reward services
    pub drop_weighted_kills: f64,
}

impl BattleTotals {
    /// Totals accumulated since `earlier` was captured.
    pub fn delta_since(&self, earlier: &BattleTotals) -> BattleTotals {
        BattleTotals {
            damage_dealt: self.damage_dealt - earlier.damage_dealt,
            damage_taken: self.damage_taken - earlier.damage_taken,
            kills: self.kills - earlier.kills,
            deaths: self.deaths - earlier.deaths,
            revives: self.revives - earlier.revives,
            waves_cleared: self.waves_cleared - earlier.waves_cleared,
            runs_completed: self.runs_completed - earlier.runs_completed,
            dungeon_resets: self.dungeon_resets - earlier.dungeon_resets,
            events_processed: self.events_processed - earlier.events_processed,
            drop_weighted_kills: self.drop_weighted_kills - earlier.drop_weighted_kills,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleState {
    pub battle_id: Uuid,
    pub options: CombatLoopOptions,
    pub rng: RngContext,
    pub clock: GameClock,
    pub scheduler: EventScheduler<BattleEvent>,
    pub player: PlayerCombatant,
    pub enemies: Vec<EnemyCombatant>,
    pub provider: EncounterSource,
    /// Group waiting for its `WaveSpawn` event
    pub pending_wave: Option<EncounterGroup>,
    pub segments: SegmentCollector,
    pub totals: BattleTotals,
}

impl BattleState {
    /// Expire buffs on every combatant. Refreshes the player's attack
    /// interval if a haste buff dropped off.
    pub fn tick_buffs(&mut self, now: f64) {
        if !self.player.buffs.tick(now).is_empty() {
            self.player.refresh_attack_interval();
        }
        for enemy in &mut self.enemies {
            enemy.buffs.tick(now);
        }
    }

    /// Check invariants on state that came from outside (snapshots).
    pub fn validate(&self) -> Result<(), String> {
        self.options.validate().map_err(|e| e.to_string())?;

        let now = self.clock.now();
        if !now.is_finite() || now < 0.0 {
            return Err(format!("clock time {} is invalid", now));
        }

        self.player
            .validate()
            .map_err(|e| format!("player: {}", e))?;

        let mut ids = BTreeSet::new();
        for enemy in &self.enemies {
            enemy
                .validate()
                .map_err(|e| format!("enemy {}: {}", enemy.encounter_id(), e))?;
            if !ids.insert(enemy.encounter_id()) {
                return Err(format!("duplicate enemy id {}", enemy.encounter_id()));
            }
        }

        self.provider.validate()?;
        self.segments.validate()?;

        if let Some(late) = self
            .scheduler
            .pending()
            .into_iter()
            .find(|entry| !(entry.execute_at >= now) || !entry.execute_at.is_finite())
        {
            return Err(format!(
                "{} event queued at {} before clock time {}",
                late.event.label(),
                late.execute_at,
                now
            ));
        }
        Ok(())
    }
}
