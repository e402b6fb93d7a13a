//! Battle orchestration: the single event loop every caller goes through.
//!
//! Online play steps the engine with small `advance_to` calls; offline
//! catch-up calls the same loop once over a long window. Both paths see the
//! same events in the same order, so results match draw for draw.

use super::event::BattleEvent;
use super::handlers::BattleContext;
use super::notify::BattleNotifier;
use super::segment::{CombatSegment, SegmentCollector};
use super::snapshot;
use super::state::{BattleState, BattleTotals};
use crate::character::profile::{validate_stats, CharacterProfile};
use crate::combat::combatant::{EnemyCombatant, PlayerCombatant};
use crate::core::clock::GameClock;
use crate::core::config::CombatLoopOptions;
use crate::core::constants::LOOT_STREAM_ID;
use crate::core::error::{BattleError, Result};
use crate::core::rng::RngContext;
use crate::core::scheduler::EventScheduler;
use crate::encounter::provider::{EncounterProvider, EncounterSource};
use crate::encounter::types::Encounter;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Everything needed to build a battle from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSetup {
    pub seed: u64,
    pub encounters: EncounterSource,
}

/// Outcome of one `advance_to` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvanceReport {
    /// Events popped, stale ones included
    pub events_processed: u64,
    pub reached_target: bool,
    pub now: f64,
    /// The event cap stopped the loop before the target time
    pub stopped_by_cap: bool,
}

pub struct BattleEngine {
    state: BattleState,
    notifier: Option<Box<dyn BattleNotifier>>,
}

impl BattleEngine {
    pub fn new(
        battle_id: Uuid,
        setup: &BattleSetup,
        character: &CharacterProfile,
        options: CombatLoopOptions,
    ) -> Result<Self> {
        options.validate()?;
        validate_stats(&character.stats).map_err(BattleError::Config)?;
        setup.encounters.validate().map_err(BattleError::Config)?;

        let mut provider = setup.encounters.clone();
        let group = provider.spawn_current();
        let segments = SegmentCollector::new(options.segment_seconds);

        let mut state = BattleState {
            battle_id,
            options,
            rng: RngContext::new(setup.seed),
            clock: GameClock::new(),
            scheduler: EventScheduler::new(),
            player: PlayerCombatant::from_profile(character),
            enemies: group
                .encounters
                .into_iter()
                .map(EnemyCombatant::bind)
                .collect(),
            provider,
            pending_wave: None,
            segments,
            totals: BattleTotals::default(),
        };

        {
            let mut ctx = BattleContext::new(&mut state, None);
            ctx.start_enemy_tracks()?;
            ctx.resume_player_tracks()?;
        }
        debug!(
            %battle_id,
            seed = setup.seed,
            enemies = state.enemies.len(),
            "battle created"
        );

        Ok(Self {
            state,
            notifier: None,
        })
    }

    /// Resume a battle from [`BattleEngine::snapshot`] output.
    ///
    /// `options` replace the stored ones; the segment window width stays as
    /// recorded so the grid does not shift mid-battle.
    pub fn restore(json: &str, options: CombatLoopOptions) -> Result<Self> {
        options.validate()?;
        let mut state = snapshot::decode(json)?;
        state.options = options;
        Ok(Self {
            state,
            notifier: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Box<dyn BattleNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn set_notifier(&mut self, notifier: Option<Box<dyn BattleNotifier>>) {
        self.notifier = notifier;
    }

    /// Run every event due at or before `target`, up to `max_events`.
    ///
    /// When the cap stops the loop the clock stays at the last handled
    /// event; call again to continue.
    pub fn advance_to(&mut self, target: f64, max_events: u64) -> Result<AdvanceReport> {
        assert!(
            target >= self.state.clock.now(),
            "advance target {} is before current time {}",
            target,
            self.state.clock.now()
        );

        let mut processed = 0u64;
        let mut stopped_by_cap = false;
        loop {
            match self.state.scheduler.peek_time() {
                Some(at) if at <= target => {}
                _ => break,
            }
            if processed >= max_events {
                stopped_by_cap = true;
                debug!(
                    battle_id = %self.state.battle_id,
                    now = self.state.clock.now(),
                    target,
                    max_events,
                    "event cap reached"
                );
                break;
            }
            let Some(entry) = self.state.scheduler.pop_next() else {
                break;
            };
            processed += 1;
            self.process(entry.execute_at, entry.event)?;
        }

        if !stopped_by_cap {
            self.state
                .segments
                .close_expired(target, &self.state.rng);
            self.state.clock.advance_to(target);
        }

        Ok(AdvanceReport {
            events_processed: processed,
            reached_target: !stopped_by_cap,
            now: self.state.clock.now(),
            stopped_by_cap,
        })
    }

    /// [`BattleEngine::advance_to`] with the configured event cap.
    pub fn advance_until(&mut self, target: f64) -> Result<AdvanceReport> {
        let cap = self.state.options.max_events_per_advance;
        self.advance_to(target, cap)
    }

    fn process(&mut self, at: f64, event: BattleEvent) -> Result<()> {
        self.state.segments.begin_event(at, &self.state.rng);
        self.state.clock.advance_to(at);
        self.state.tick_buffs(at);

        let handled = {
            let mut ctx = BattleContext::new(&mut self.state, self.notifier.as_mut());
            event.execute(&mut ctx)?
        };
        if handled {
            self.state.segments.record_event();
            self.state.totals.events_processed += 1;
        }
        Ok(())
    }

    pub fn battle_id(&self) -> Uuid {
        self.state.battle_id
    }

    pub fn now(&self) -> f64 {
        self.state.clock.now()
    }

    pub fn options(&self) -> &CombatLoopOptions {
        &self.state.options
    }

    pub fn totals(&self) -> &BattleTotals {
        &self.state.totals
    }

    /// RNG draws consumed so far.
    pub fn seed_index_end(&self) -> u64 {
        self.state.rng.index()
    }

    pub fn seed(&self) -> u64 {
        self.state.rng.seed()
    }

    /// Independent stream for reward rolls; drawing from it never perturbs combat.
    pub fn loot_stream(&self) -> RngContext {
        self.state.rng.split(LOOT_STREAM_ID)
    }

    pub fn segments(&self) -> &[CombatSegment] {
        self.state.segments.segments()
    }

    pub fn open_segment(&self) -> Option<&CombatSegment> {
        self.state.segments.open_segment()
    }

    pub fn drain_segments(&mut self) -> Vec<CombatSegment> {
        self.state.segments.drain()
    }

    /// Close the open segment at the current time.
    pub fn flush_segments(&mut self) {
        let now = self.state.clock.now();
        self.state.segments.flush(now, &self.state.rng);
    }

    pub fn player(&self) -> &PlayerCombatant {
        &self.state.player
    }

    pub fn enemies(&self) -> &[EnemyCombatant] {
        &self.state.enemies
    }

    /// Encounters of the active wave, dead ones included.
    pub fn encounters(&self) -> Vec<&Encounter> {
        self.state.enemies.iter().map(|e| e.encounter()).collect()
    }

    pub fn wave_index(&self) -> usize {
        self.state.provider.wave_index()
    }

    pub fn pending_events(&self) -> usize {
        self.state.scheduler.len()
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn snapshot(&self) -> Result<String> {
        snapshot::encode(&self.state)
    }
}
