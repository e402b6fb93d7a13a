//! Batch settlement of every running plan, e.g. after a server restart.

use super::fast_forward::{OfflineFastForwardEngine, OfflineSettlement};
use super::plan::ActivityPlan;
use crate::character::profile::CharacterProfile;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryFailure {
    pub battle_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveryReport {
    pub settlements: Vec<OfflineSettlement>,
    /// Plans whose snapshot failed integrity checks and was dropped
    pub discarded_snapshots: Vec<Uuid>,
    pub failures: Vec<RecoveryFailure>,
    /// Plans that were not running
    pub skipped: Vec<Uuid>,
}

/// Settle each running plan for the time since its last settlement.
///
/// One bad plan never stops the batch. A snapshot that fails integrity
/// checks is discarded; the plan keeps its `last_settled_at`, so the next
/// pass rebuilds the battle from its setup and settles the full gap.
///
/// A rebuilt battle starts again at t=0 with the plan's seed while
/// `executed_seconds` keeps counting, so it replays the opening the plan
/// already settled: segments restart at RNG index 0 and totals repeat.
/// Such settlements carry `rebuilt_from_setup` so reward services can
/// decide how to credit them.
pub fn recover_offline_plans(
    engine: &OfflineFastForwardEngine,
    plans: &mut [ActivityPlan],
    characters: &HashMap<Uuid, CharacterProfile>,
    now: DateTime<Utc>,
    max_cap_seconds: Option<f64>,
) -> RecoveryReport {
    let cap = max_cap_seconds.unwrap_or(engine.options().default_offline_cap_seconds);
    let mut report = RecoveryReport::default();

    for plan in plans.iter_mut() {
        if !plan.is_running() {
            report.skipped.push(plan.battle_id);
            continue;
        }
        let Some(character) = characters.get(&plan.character_id) else {
            warn!(battle_id = %plan.battle_id, character_id = %plan.character_id, "character missing for plan");
            report.failures.push(RecoveryFailure {
                battle_id: plan.battle_id,
                reason: format!("character {} not found", plan.character_id),
            });
            continue;
        };

        let offline_seconds =
            ((now - plan.last_settled_at).num_milliseconds() as f64 / 1000.0).max(0.0);

        match engine.fast_forward(character, plan, offline_seconds, cap) {
            Ok(settlement) => {
                plan.last_settled_at = now;
                report.settlements.push(settlement);
            }
            Err(err) if err.is_data_integrity() => {
                warn!(battle_id = %plan.battle_id, error = %err, "discarding corrupt battle snapshot");
                plan.battle_state_json = None;
                report.discarded_snapshots.push(plan.battle_id);
            }
            Err(err) => {
                warn!(battle_id = %plan.battle_id, error = %err, "offline recovery failed");
                report.failures.push(RecoveryFailure {
                    battle_id: plan.battle_id,
                    reason: err.to_string(),
                });
            }
        }
    }
    report
}
