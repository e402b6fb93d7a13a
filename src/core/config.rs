//! Combat loop configuration.
//!
//! Global defaults for the battle loop. Professions may override the track
//! policies; see [`crate::character::profession::Profession`].

use super::constants::*;
use super::error::{BattleError, Result};
use serde::{Deserialize, Serialize};

/// How a track behaves around enemy-free windows and resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPolicy {
    /// Fire at the resume time instead of waiting a full interval.
    pub start_immediately: bool,
    /// Pause while no enemies are present (otherwise keep pulsing).
    pub pause_when_no_enemies: bool,
}

impl Default for TrackPolicy {
    fn default() -> Self {
        Self {
            start_immediately: false,
            pause_when_no_enemies: true,
        }
    }
}

/// Optional per-profession override of a [`TrackPolicy`].
///
/// Any field set here wins over the global default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackPolicyOverride {
    pub start_immediately: Option<bool>,
    pub pause_when_no_enemies: Option<bool>,
}

impl TrackPolicyOverride {
    pub fn resolve(&self, global: TrackPolicy) -> TrackPolicy {
        TrackPolicy {
            start_immediately: self.start_immediately.unwrap_or(global.start_immediately),
            pause_when_no_enemies: self
                .pause_when_no_enemies
                .unwrap_or(global.pause_when_no_enemies),
        }
    }
}

/// Configuration for the battle loop.
///
/// IMPORTANT: New fields need `#[serde(default)]` so snapshots written by
/// older builds keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatLoopOptions {
    /// Width of a segment window in simulated seconds
    pub segment_seconds: f64,

    /// Safety cap on events handled by one `advance_until` call
    pub max_events_per_advance: u64,

    /// Delay between player death and auto-revive
    pub revive_duration_seconds: f64,

    /// Default policy for the player's attack track
    pub attack_policy: TrackPolicy,

    /// Default policy for the player's special track
    pub special_policy: TrackPolicy,

    /// Offline catch-up cap used when the caller does not pass one
    pub default_offline_cap_seconds: f64,
}

impl Default for CombatLoopOptions {
    fn default() -> Self {
        Self {
            segment_seconds: DEFAULT_SEGMENT_SECONDS,
            max_events_per_advance: DEFAULT_MAX_EVENTS_PER_ADVANCE,
            revive_duration_seconds: DEFAULT_REVIVE_DURATION_SECONDS,
            attack_policy: TrackPolicy::default(),
            special_policy: TrackPolicy::default(),
            default_offline_cap_seconds: DEFAULT_OFFLINE_CAP_SECONDS,
        }
    }
}

impl CombatLoopOptions {
    /// Parse options from JSON, filling missing fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.segment_seconds > 0.0) {
            return Err(BattleError::Config(format!(
                "segment_seconds must be positive, got {}",
                self.segment_seconds
            )));
        }
        if self.max_events_per_advance == 0 {
            return Err(BattleError::Config(
                "max_events_per_advance must be at least 1".to_string(),
            ));
        }
        if !(self.revive_duration_seconds >= 0.0) {
            return Err(BattleError::Config(format!(
                "revive_duration_seconds must be non-negative, got {}",
                self.revive_duration_seconds
            )));
        }
        if !(self.default_offline_cap_seconds >= 0.0) {
            return Err(BattleError::Config(format!(
                "default_offline_cap_seconds must be non-negative, got {}",
                self.default_offline_cap_seconds
            )));
        }
        Ok(())
    }
}
