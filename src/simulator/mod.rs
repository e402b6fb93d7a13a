//! Battle balance simulator for Monte Carlo analysis.
//!
//! Run many seeded battles to analyze:
//! - Damage output per profession
//! - Death rates against each encounter
//! - Dungeon clear pacing
//! - Online/offline equivalence over long windows

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::{RunStats, SimReport};
pub use runner::run_simulation;
