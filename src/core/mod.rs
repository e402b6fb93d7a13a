//! Simulation substrate: RNG, clock, event queue, errors and configuration.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod rng;
pub mod scheduler;

pub use clock::GameClock;
pub use config::{CombatLoopOptions, TrackPolicy, TrackPolicyOverride};
pub use error::{BattleError, Result};
pub use rng::{RngContext, RngState};
pub use scheduler::{EventScheduler, ScheduledEvent};
