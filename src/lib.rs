//! Idle Battle - deterministic combat simulation core for an idle RPG.
//!
//! One seeded event loop drives live play, offline catch-up and balance
//! simulation. Given the same seed, setup and options, every path produces
//! the same damage, kills and random draws.

pub mod battle;
pub mod character;
pub mod combat;
pub mod core;
pub mod encounter;
pub mod offline;
pub mod simulator;

pub use battle::engine::{AdvanceReport, BattleEngine, BattleSetup};
pub use core::config::CombatLoopOptions;
pub use core::error::{BattleError, Result};
