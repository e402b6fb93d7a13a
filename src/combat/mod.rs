//! Combat primitives: vitals, tracks, buffs, skills, combatants, targeting.

pub mod buff;
pub mod combatant;
pub mod logic;
pub mod skill;
pub mod targeting;
pub mod track;
pub mod types;

pub use buff::{BuffDefinition, BuffInstance, BuffManager, BuffOwner, StatModifiers, TagRecorder};
pub use combatant::{Combatant, EnemyCombatant, PlayerCombatant};
pub use logic::HitOutcome;
pub use skill::{EnemySkillDefinition, SkillEffect, SkillManager, SkillTrigger};
pub use targeting::select_target;
pub use track::{Track, TrackKind, TrackState};
pub use types::{CombatantId, LifeState, Vitals};
