//! Encounter providers decide what spawns after a wave is cleared and what a
//! player death means for the run.

use super::types::{DungeonDefinition, EncounterGroup, EnemyDefinition};
use serde::{Deserialize, Serialize};

/// Result of asking a provider for the next wave.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveAdvance {
    /// `None` once the provider is exhausted
    pub next_group: Option<EncounterGroup>,
    /// The clear that triggered this advance finished a dungeon run
    pub run_completed: bool,
    /// Seconds between the clear and the next spawn
    pub delay_seconds: f64,
}

/// What happens when the player dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathPolicy {
    /// Revive after the configured revive duration and keep fighting
    AutoRevive,
    /// Rewind the dungeon to wave 0, then revive with the run respawn delay
    ResetRun,
    /// Stay dead
    Defeat,
}

pub trait EncounterProvider {
    /// Spawn the wave the provider currently points at.
    fn spawn_current(&mut self) -> EncounterGroup;

    /// Move past a cleared wave.
    fn try_advance(&mut self) -> WaveAdvance;

    /// Rewind to the first wave after a death in enhanced mode.
    fn reset_run(&mut self) -> WaveAdvance;

    fn death_policy(&self) -> DeathPolicy;
    fn drop_multiplier(&self) -> f64;
    fn wave_index(&self) -> usize;
    fn validate(&self) -> Result<(), String>;
}

/// Endless farming of one enemy group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleEnemyProvider {
    enemies: Vec<EnemyDefinition>,
    respawn_delay: f64,
    auto_revive: bool,
    next_serial: u64,
}

impl SingleEnemyProvider {
    pub fn new(enemies: Vec<EnemyDefinition>, respawn_delay: f64) -> Self {
        Self {
            enemies,
            respawn_delay,
            auto_revive: true,
            next_serial: 1,
        }
    }

    pub fn without_revive(mut self) -> Self {
        self.auto_revive = false;
        self
    }
}

impl EncounterProvider for SingleEnemyProvider {
    fn spawn_current(&mut self) -> EncounterGroup {
        let serial = self.next_serial;
        self.next_serial += 1;
        EncounterGroup::new(0, serial, &self.enemies)
    }

    fn try_advance(&mut self) -> WaveAdvance {
        WaveAdvance {
            next_group: Some(self.spawn_current()),
            run_completed: false,
            delay_seconds: self.respawn_delay,
        }
    }

    fn reset_run(&mut self) -> WaveAdvance {
        self.try_advance()
    }

    fn death_policy(&self) -> DeathPolicy {
        if self.auto_revive {
            DeathPolicy::AutoRevive
        } else {
            DeathPolicy::Defeat
        }
    }

    fn drop_multiplier(&self) -> f64 {
        1.0
    }

    fn wave_index(&self) -> usize {
        0
    }

    fn validate(&self) -> Result<(), String> {
        if self.enemies.is_empty() {
            return Err("encounter has no enemies".to_string());
        }
        if !(self.respawn_delay >= 0.0) {
            return Err(format!("respawn delay must be non-negative, got {}", self.respawn_delay));
        }
        for enemy in &self.enemies {
            enemy.validate()?;
        }
        Ok(())
    }
}

/// Ordered dungeon waves, looping runs until `max_runs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonProvider {
    definition: DungeonDefinition,
    current_wave: usize,
    runs_completed: u32,
    exhausted: bool,
    next_serial: u64,
}

impl DungeonProvider {
    pub fn new(definition: DungeonDefinition) -> Self {
        Self {
            definition,
            current_wave: 0,
            runs_completed: 0,
            exhausted: false,
            next_serial: 1,
        }
    }

    pub fn definition(&self) -> &DungeonDefinition {
        &self.definition
    }

    pub fn runs_completed(&self) -> u32 {
        self.runs_completed
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn spawn_or_none(&mut self, run_completed: bool, delay_seconds: f64) -> WaveAdvance {
        let next_group = if self.exhausted {
            None
        } else {
            Some(self.spawn_current())
        };
        WaveAdvance {
            next_group,
            run_completed,
            delay_seconds,
        }
    }
}

impl EncounterProvider for DungeonProvider {
    fn spawn_current(&mut self) -> EncounterGroup {
        let serial = self.next_serial;
        self.next_serial += 1;
        let wave = &self.definition.waves[self.current_wave];
        EncounterGroup::new(self.current_wave, serial, &wave.enemies)
    }

    fn try_advance(&mut self) -> WaveAdvance {
        if self.exhausted {
            return self.spawn_or_none(false, 0.0);
        }
        if self.current_wave + 1 < self.definition.waves.len() {
            self.current_wave += 1;
            let delay = self.definition.wave_respawn_delay;
            return self.spawn_or_none(false, delay);
        }

        // Last wave down: the run is complete
        self.runs_completed += 1;
        self.current_wave = 0;
        if let Some(max_runs) = self.definition.max_runs {
            if self.runs_completed >= max_runs {
                self.exhausted = true;
            }
        }
        let delay = self.definition.run_respawn_delay;
        self.spawn_or_none(true, delay)
    }

    fn reset_run(&mut self) -> WaveAdvance {
        self.current_wave = 0;
        let delay = self.definition.run_respawn_delay;
        self.spawn_or_none(false, delay)
    }

    fn death_policy(&self) -> DeathPolicy {
        if self.definition.reset_on_death {
            DeathPolicy::ResetRun
        } else if self.definition.auto_revive {
            DeathPolicy::AutoRevive
        } else {
            DeathPolicy::Defeat
        }
    }

    fn drop_multiplier(&self) -> f64 {
        self.definition.drop_multiplier
    }

    fn wave_index(&self) -> usize {
        self.current_wave
    }

    fn validate(&self) -> Result<(), String> {
        self.definition.validate()?;
        if self.current_wave >= self.definition.waves.len() {
            return Err(format!(
                "wave index {} out of range for {} waves",
                self.current_wave,
                self.definition.waves.len()
            ));
        }
        Ok(())
    }
}

/// Serializable choice of provider carried in battle setups and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterSource {
    Single(SingleEnemyProvider),
    Dungeon(DungeonProvider),
}

impl EncounterSource {
    pub fn single(enemies: Vec<EnemyDefinition>, respawn_delay: f64) -> Self {
        EncounterSource::Single(SingleEnemyProvider::new(enemies, respawn_delay))
    }

    pub fn dungeon(definition: DungeonDefinition) -> Self {
        EncounterSource::Dungeon(DungeonProvider::new(definition))
    }

    fn provider(&self) -> &dyn EncounterProvider {
        match self {
            EncounterSource::Single(p) => p,
            EncounterSource::Dungeon(p) => p,
        }
    }

    fn provider_mut(&mut self) -> &mut dyn EncounterProvider {
        match self {
            EncounterSource::Single(p) => p,
            EncounterSource::Dungeon(p) => p,
        }
    }
}

impl EncounterProvider for EncounterSource {
    fn spawn_current(&mut self) -> EncounterGroup {
        self.provider_mut().spawn_current()
    }

    fn try_advance(&mut self) -> WaveAdvance {
        self.provider_mut().try_advance()
    }

    fn reset_run(&mut self) -> WaveAdvance {
        self.provider_mut().reset_run()
    }

    fn death_policy(&self) -> DeathPolicy {
        self.provider().death_policy()
    }

    fn drop_multiplier(&self) -> f64 {
        self.provider().drop_multiplier()
    }

    fn wave_index(&self) -> usize {
        self.provider().wave_index()
    }

    fn validate(&self) -> Result<(), String> {
        self.provider().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encounter::types::Wave;

    fn enemy(id: &str) -> EnemyDefinition {
        EnemyDefinition {
            id: id.to_string(),
            name: id.to_string(),
            max_hp: 10.0,
            damage: 1.0,
            attack_interval: 2.0,
            threat_weight: 1.0,
            skills: Vec::new(),
        }
    }

    fn dungeon(max_runs: Option<u32>) -> DungeonDefinition {
        DungeonDefinition {
            id: "test".to_string(),
            name: "Test".to_string(),
            waves: vec![
                Wave {
                    enemies: vec![enemy("a"), enemy("a")],
                },
                Wave {
                    enemies: vec![enemy("boss")],
                },
            ],
            wave_respawn_delay: 3.0,
            run_respawn_delay: 10.0,
            auto_revive: true,
            drop_multiplier: 1.5,
            reset_on_death: false,
            max_runs,
        }
    }

    #[test]
    fn test_single_provider_respawns_forever_with_fresh_serials() {
        let mut provider = SingleEnemyProvider::new(vec![enemy("boar")], 2.5);
        let first = provider.spawn_current();
        let next = provider.try_advance();
        let group = next.next_group.unwrap();
        assert_ne!(first.wave_serial, group.wave_serial);
        assert_eq!(next.delay_seconds, 2.5);
        assert!(!next.run_completed);
        assert_eq!(provider.death_policy(), DeathPolicy::AutoRevive);
    }

    #[test]
    fn test_dungeon_walks_waves_then_loops() {
        let mut provider = DungeonProvider::new(dungeon(None));
        let first = provider.spawn_current();
        assert_eq!(first.wave_index, 0);
        assert_eq!(first.len(), 2);

        let second = provider.try_advance();
        assert_eq!(second.next_group.as_ref().unwrap().wave_index, 1);
        assert_eq!(second.delay_seconds, 3.0);
        assert!(!second.run_completed);

        let looped = provider.try_advance();
        assert!(looped.run_completed);
        assert_eq!(looped.delay_seconds, 10.0);
        assert_eq!(looped.next_group.unwrap().wave_index, 0);
        assert_eq!(provider.runs_completed(), 1);
    }

    #[test]
    fn test_dungeon_exhausts_after_max_runs() {
        let mut provider = DungeonProvider::new(dungeon(Some(1)));
        provider.spawn_current();
        provider.try_advance();
        let last = provider.try_advance();
        assert!(last.run_completed);
        assert!(last.next_group.is_none());
        assert!(provider.is_exhausted());
        assert!(provider.try_advance().next_group.is_none());
    }

    #[test]
    fn test_reset_run_rewinds_to_first_wave() {
        let mut def = dungeon(None);
        def.reset_on_death = true;
        let mut provider = DungeonProvider::new(def);
        provider.spawn_current();
        provider.try_advance();
        assert_eq!(provider.wave_index(), 1);
        assert_eq!(provider.death_policy(), DeathPolicy::ResetRun);

        let reset = provider.reset_run();
        assert_eq!(provider.wave_index(), 0);
        assert_eq!(reset.next_group.unwrap().wave_index, 0);
        assert_eq!(reset.delay_seconds, 10.0);
    }

    #[test]
    fn test_source_delegates_and_roundtrips() {
        let mut source = EncounterSource::dungeon(dungeon(None));
        assert_eq!(source.drop_multiplier(), 1.5);
        source.spawn_current();
        source.try_advance();
        let json = serde_json::to_string(&source).unwrap();
        let back: EncounterSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, source);
        assert_eq!(back.wave_index(), 1);
    }

    #[test]
    fn test_single_validate_rejects_empty() {
        let provider = SingleEnemyProvider::new(Vec::new(), 1.0);
        assert!(provider.validate().is_err());
    }
}
