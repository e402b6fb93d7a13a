//! Recurring attack/special timers.
//!
//! A track is either `Active { next_at }` or `Paused`. External callers that
//! expect the older float convention read [`Track::next_trigger_at`], which
//! reports [`PAUSED_SENTINEL`] while paused.
//!
//! Every (re)start bumps the generation. Queued events carry the generation
//! they were scheduled with, so anything queued before a pause is ignored.

use crate::core::constants::{PAUSED_SENTINEL, SENTINEL_THRESHOLD};
use crate::core::error::{BattleError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Attack,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackState {
    Active { next_at: f64 },
    Paused,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    kind: TrackKind,
    current_interval: f64,
    state: TrackState,
    generation: u64,
}

impl Track {
    /// New tracks start paused.
    pub fn new(kind: TrackKind, interval: f64) -> Self {
        assert!(interval > 0.0, "track interval must be positive, got {}", interval);
        Self {
            kind,
            current_interval: interval,
            state: TrackState::Paused,
            generation: 0,
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn current_interval(&self) -> f64 {
        self.current_interval
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.next_trigger_at() < SENTINEL_THRESHOLD
    }

    pub fn next_trigger_at(&self) -> f64 {
        match self.state {
            TrackState::Active { next_at } => next_at,
            TrackState::Paused => PAUSED_SENTINEL,
        }
    }

    /// True when an event queued with `generation` is still the live one.
    pub fn accepts(&self, generation: u64) -> bool {
        self.is_active() && self.generation == generation
    }

    pub fn set_interval(&mut self, interval: f64) {
        assert!(interval > 0.0, "track interval must be positive, got {}", interval);
        self.current_interval = interval;
    }

    /// Start a paused track. Returns the first trigger time.
    pub fn start(&mut self, now: f64, immediately: bool) -> Result<f64> {
        if self.is_active() {
            return Err(BattleError::InvalidStateTransition(format!(
                "{:?} track is already running",
                self.kind
            )));
        }
        let next_at = if immediately {
            now
        } else {
            now + self.current_interval
        };
        self.state = TrackState::Active { next_at };
        self.generation += 1;
        Ok(next_at)
    }

    /// Start the track if it is paused; `None` if it was already running.
    pub fn resume(&mut self, now: f64, immediately: bool) -> Option<f64> {
        if self.is_active() {
            return None;
        }
        self.start(now, immediately).ok()
    }

    /// Record a firing at `now` and return the next trigger time.
    pub fn fire(&mut self, now: f64) -> Result<f64> {
        if !self.is_active() {
            return Err(BattleError::InvalidStateTransition(format!(
                "{:?} track fired while paused",
                self.kind
            )));
        }
        let next_at = now + self.current_interval;
        self.state = TrackState::Active { next_at };
        Ok(next_at)
    }

    pub fn pause(&mut self) {
        if self.is_active() {
            self.state = TrackState::Paused;
            self.generation += 1;
        }
    }

    /// Check invariants on a track loaded from outside.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.current_interval > 0.0) || !self.current_interval.is_finite() {
            return Err(format!(
                "{:?} track interval must be positive, got {}",
                self.kind, self.current_interval
            ));
        }
        if let TrackState::Active { next_at } = self.state {
            if !next_at.is_finite() {
                return Err(format!("{:?} track next trigger {} is invalid", self.kind, next_at));
            }
        }
        Ok(())
    }

    /// Drop partial progress: the next trigger is a full interval from `now`.
    pub fn reset_progress(&mut self, now: f64) -> Option<f64> {
        if !self.is_active() {
            return None;
        }
        let next_at = now + self.current_interval;
        self.state = TrackState::Active { next_at };
        self.generation += 1;
        Some(next_at)
    }
}
