//! Offline catch-up: run the battle loop synchronously over the time the
//! player was away, then persist where it stopped.

use super::plan::{ActivityPlan, PlanStatus};
use crate::battle::engine::BattleEngine;
use crate::battle::segment::CombatSegment;
use crate::battle::state::BattleTotals;
use crate::character::profile::CharacterProfile;
use crate::core::config::CombatLoopOptions;
use crate::core::error::{BattleError, Result};
use tracing::info;
use uuid::Uuid;

/// What one fast-forward produced. Totals cover this settlement only.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineSettlement {
    pub battle_id: Uuid,
    pub simulated_seconds: f64,
    pub totals: BattleTotals,
    pub rng_index_start: u64,
    pub rng_index_end: u64,
    pub segments: Vec<CombatSegment>,
    pub completed: bool,
    /// The plan had settled time but no snapshot, so the battle restarted
    /// from its setup at t=0. Totals and segments then repeat ground that
    /// earlier settlements already credited.
    pub rebuilt_from_setup: bool,
}

impl OfflineSettlement {
    pub fn kills(&self) -> u64 {
        self.totals.kills
    }
}

#[derive(Debug, Clone, Default)]
pub struct OfflineFastForwardEngine {
    options: CombatLoopOptions,
}

impl OfflineFastForwardEngine {
    pub fn new(options: CombatLoopOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CombatLoopOptions {
        &self.options
    }

    /// Restore the plan's battle, or build it fresh when it has no snapshot.
    pub fn load_engine(
        &self,
        character: &CharacterProfile,
        plan: &ActivityPlan,
    ) -> Result<BattleEngine> {
        match &plan.battle_state_json {
            Some(json) => {
                let engine = BattleEngine::restore(json, self.options.clone())?;
                if engine.battle_id() != plan.battle_id {
                    return Err(BattleError::DataIntegrityViolation(format!(
                        "snapshot belongs to battle {}, plan is {}",
                        engine.battle_id(),
                        plan.battle_id
                    )));
                }
                Ok(engine)
            }
            None => BattleEngine::new(
                plan.battle_id,
                &plan.setup,
                character,
                self.options.clone(),
            ),
        }
    }

    pub fn fast_forward(
        &self,
        character: &CharacterProfile,
        plan: &mut ActivityPlan,
        offline_seconds: f64,
        max_cap_seconds: f64,
    ) -> Result<OfflineSettlement> {
        if !plan.is_running() {
            return Err(BattleError::InvalidStateTransition(format!(
                "plan {} is already completed",
                plan.battle_id
            )));
        }
        if plan.character_id != character.id {
            return Err(BattleError::DataIntegrityViolation(format!(
                "plan {} belongs to character {}, not {}",
                plan.battle_id, plan.character_id, character.id
            )));
        }

        let simulated = plan.simulatable_seconds(offline_seconds, max_cap_seconds);
        let rebuilt_from_setup = plan.battle_state_json.is_none() && plan.executed_seconds > 0.0;
        let mut engine = self.load_engine(character, plan)?;
        let totals_before = engine.totals().clone();
        let rng_index_start = engine.seed_index_end();

        let target = engine.now() + simulated;
        while !engine.advance_until(target)?.reached_target {}

        plan.executed_seconds += simulated;
        let completed = plan.duration_reached();
        if completed {
            engine.flush_segments();
        }
        let segments = engine.drain_segments();

        if completed {
            plan.status = PlanStatus::Completed;
            plan.battle_state_json = None;
        } else {
            plan.battle_state_json = Some(engine.snapshot()?);
        }

        let totals = engine.totals().delta_since(&totals_before);
        let rng_index_end = engine.seed_index_end();
        info!(
            battle_id = %plan.battle_id,
            simulated_seconds = simulated,
            kills = totals.kills,
            damage = totals.damage_dealt,
            rng_start = rng_index_start,
            rng_end = rng_index_end,
            completed,
            rebuilt_from_setup,
            "offline settlement"
        );

        Ok(OfflineSettlement {
            battle_id: plan.battle_id,
            simulated_seconds: simulated,
            totals,
            rng_index_start,
            rng_index_end,
            segments,
            completed,
            rebuilt_from_setup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::engine::BattleSetup;
    use crate::character::profession::ProfessionId;
    use crate::character::profile::CharacterStats;
    use crate::encounter::presets;
    use crate::encounter::provider::EncounterSource;
    use crate::offline::plan::PlanDuration;
    use chrono::Utc;

    fn character() -> CharacterProfile {
        CharacterProfile::new("Idle", ProfessionId::Ranger, CharacterStats::default())
    }

    fn plan_for(character: &CharacterProfile, duration: PlanDuration) -> ActivityPlan {
        let setup = BattleSetup {
            seed: 42,
            encounters: EncounterSource::single(vec![presets::forest_wolf()], 2.0),
        };
        ActivityPlan::new(character.id, duration, setup, Utc::now())
    }

    #[test]
    fn test_finite_plan_completes_and_drops_snapshot() {
        let hero = character();
        let mut plan = plan_for(&hero, PlanDuration::Finite { seconds: 3600.0 });
        let engine = OfflineFastForwardEngine::default();

        let first = engine.fast_forward(&hero, &mut plan, 2700.0, 43200.0).unwrap();
        assert_eq!(first.simulated_seconds, 2700.0);
        assert!(!first.completed);
        assert!(!first.rebuilt_from_setup);
        assert!(plan.battle_state_json.is_some());

        let second = engine.fast_forward(&hero, &mut plan, 1800.0, 43200.0).unwrap();
        assert_eq!(second.simulated_seconds, 900.0);
        assert_eq!(plan.executed_seconds, 3600.0);
        assert!(second.completed);
        assert_eq!(plan.status, PlanStatus::Completed);
        assert!(plan.battle_state_json.is_none());
        assert_eq!(second.rng_index_start, first.rng_index_end);
    }

    #[test]
    fn test_completed_plan_rejected() {
        let hero = character();
        let mut plan = plan_for(&hero, PlanDuration::Finite { seconds: 10.0 });
        let engine = OfflineFastForwardEngine::default();
        engine.fast_forward(&hero, &mut plan, 60.0, 43200.0).unwrap();
        let again = engine.fast_forward(&hero, &mut plan, 60.0, 43200.0);
        assert!(matches!(again, Err(BattleError::InvalidStateTransition(_))));
    }

    #[test]
    fn test_orphaned_snapshot_is_integrity_violation() {
        let hero = character();
        let engine = OfflineFastForwardEngine::default();
        let mut donor = plan_for(&hero, PlanDuration::Infinite);
        engine.fast_forward(&hero, &mut donor, 30.0, 43200.0).unwrap();

        let mut plan = plan_for(&hero, PlanDuration::Infinite);
        plan.battle_state_json = donor.battle_state_json.clone();
        let err = engine
            .fast_forward(&hero, &mut plan, 30.0, 43200.0)
            .unwrap_err();
        assert!(err.is_data_integrity());
    }
}
