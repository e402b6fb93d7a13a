//! Main simulation runner.
//!
//! Every battle runs through `BattleEngine`, the same loop live play uses,
//! so the numbers here are the numbers players get.

use super::config::SimConfig;
use super::report::{RunStats, SimReport};
use crate::battle::engine::{BattleEngine, BattleSetup};
use crate::battle::notify::TracingNotifier;
use crate::character::profile::CharacterProfile;
use crate::core::constants::SIMULATOR_STREAM_ID;
use crate::core::error::{BattleError, Result};
use crate::core::rng::RngContext;
use crate::encounter::presets::preset_source;
use crate::offline::fast_forward::OfflineFastForwardEngine;
use crate::offline::plan::{ActivityPlan, PlanDuration};
use chrono::Utc;
use uuid::Uuid;

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> Result<SimReport> {
    if !(config.duration_seconds > 0.0) || !(config.step_seconds > 0.0) {
        return Err(BattleError::Config(
            "duration and step must be positive".to_string(),
        ));
    }
    let encounters = preset_source(&config.encounter).ok_or_else(|| {
        BattleError::Config(format!("unknown encounter preset '{}'", config.encounter))
    })?;
    let base_seed = config.seed.unwrap_or_else(rand::random);
    let seeds = RngContext::new(base_seed);
    let character = CharacterProfile::new("Simulant", config.profession, config.stats);

    let mut all_runs = Vec::with_capacity(config.num_runs as usize);
    for run_idx in 0..config.num_runs {
        // Independent per-run streams derived from the base seed
        let seed = seeds.split(SIMULATOR_STREAM_ID + u64::from(run_idx)).seed();
        let setup = BattleSetup {
            seed,
            encounters: encounters.clone(),
        };
        let run = simulate_single_run(config, &setup, &character)?;

        if config.verbosity >= 2 {
            println!(
                "Run {}/{} - seed {}, kills {}, deaths {}, dps {:.1}, draws {}",
                run_idx + 1,
                config.num_runs,
                run.seed,
                run.kills,
                run.deaths,
                run.dps,
                run.rng_draws
            );
        }
        all_runs.push(run);
    }

    Ok(SimReport::from_runs(config, all_runs))
}

fn simulate_single_run(
    config: &SimConfig,
    setup: &BattleSetup,
    character: &CharacterProfile,
) -> Result<RunStats> {
    let mut engine = BattleEngine::new(Uuid::new_v4(), setup, character, config.options.clone())?;
    if config.verbosity >= 3 {
        engine.set_notifier(Some(Box::new(TracingNotifier)));
    }

    let mut t = 0.0;
    while t < config.duration_seconds {
        t = (t + config.step_seconds).min(config.duration_seconds);
        while !engine.advance_until(t)?.reached_target {}
    }
    let totals = engine.totals().clone();
    let rng_draws = engine.seed_index_end();
    engine.flush_segments();
    let segments = engine.drain_segments().len();

    let offline_matches = if config.verify_offline {
        let mut plan = ActivityPlan::new(
            character.id,
            PlanDuration::Finite {
                seconds: config.duration_seconds,
            },
            setup.clone(),
            Utc::now(),
        );
        let settlement = OfflineFastForwardEngine::new(config.options.clone()).fast_forward(
            character,
            &mut plan,
            config.duration_seconds,
            config.duration_seconds,
        )?;
        Some(
            settlement.rng_index_end == rng_draws
                && settlement.totals.damage_dealt == totals.damage_dealt
                && settlement.totals.kills == totals.kills,
        )
    } else {
        None
    };

    Ok(RunStats {
        seed: setup.seed,
        kills: totals.kills,
        deaths: totals.deaths,
        damage_dealt: totals.damage_dealt,
        damage_taken: totals.damage_taken,
        dps: totals.damage_dealt / config.duration_seconds,
        waves_cleared: totals.waves_cleared,
        runs_completed: totals.runs_completed,
        dungeon_resets: totals.dungeon_resets,
        rng_draws,
        segments,
        offline_matches,
    })
}
