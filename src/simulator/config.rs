//! Simulation configuration.

use crate::character::profession::ProfessionId;
use crate::character::profile::CharacterStats;
use crate::core::config::CombatLoopOptions;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of simulated battles
    pub num_runs: u32,

    /// Base seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Simulated seconds per battle
    pub duration_seconds: f64,

    /// Online step size; each battle advances in increments of this many seconds
    pub step_seconds: f64,

    /// Encounter preset name (see `encounter::presets::PRESET_NAMES`)
    pub encounter: String,

    pub profession: ProfessionId,
    pub stats: CharacterStats,
    pub options: CombatLoopOptions,

    /// Re-run every battle through the offline engine and compare results
    pub verify_offline: bool,

    /// Log verbosity (0 = silent, 1 = summary, 2 = detailed)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            duration_seconds: 3600.0,
            step_seconds: 1.0,
            encounter: "meadow_boar".to_string(),
            profession: ProfessionId::Warrior,
            stats: CharacterStats::default(),
            options: CombatLoopOptions::default(),
            verify_offline: false,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for a fast balance check
    pub fn quick() -> Self {
        Self {
            num_runs: 20,
            duration_seconds: 600.0,
            ..Default::default()
        }
    }

    /// Dungeon balance for one profession
    pub fn dungeon_balance(profession: ProfessionId) -> Self {
        Self {
            num_runs: 50,
            duration_seconds: 2.0 * 3600.0,
            encounter: "sunken_crypt".to_string(),
            profession,
            stats: CharacterStats {
                attack_power: 22.0,
                stamina: 30.0,
                armor: 40.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Long battles checked against the offline engine
    pub fn determinism_check() -> Self {
        Self {
            num_runs: 10,
            duration_seconds: 4.0 * 3600.0,
            step_seconds: 7.5,
            verify_offline: true,
            ..Default::default()
        }
    }
}
