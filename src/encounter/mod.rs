//! Enemy definitions, wave groups, and the providers that sequence them.

pub mod presets;
pub mod provider;
pub mod types;

pub use provider::{
    DeathPolicy, DungeonProvider, EncounterProvider, EncounterSource, SingleEnemyProvider,
    WaveAdvance,
};
pub use types::{DungeonDefinition, Encounter, EncounterGroup, EncounterId, EnemyDefinition, Wave};
