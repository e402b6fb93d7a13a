//! Event handlers. Each runs with the clock already at the event time.

use super::event::BattleEvent;
use super::notify::{BattleNotifier, Notification};
use super::state::BattleState;
use crate::character::profession::SpecialAction;
use crate::combat::buff::TagRecorder;
use crate::combat::combatant::{Combatant, EnemyCombatant};
use crate::combat::logic::{
    enemy_hit_damage, player_damage_reduction, roll_player_hit, HitOutcome,
};
use crate::combat::skill::SkillEffect;
use crate::combat::targeting::select_target;
use crate::core::config::TrackPolicy;
use crate::core::constants::*;
use crate::core::error::Result;
use crate::encounter::provider::{DeathPolicy, EncounterProvider};
use crate::encounter::types::EncounterId;
use tracing::debug;

const SOURCE_ATTACK: &str = "attack";
const SOURCE_SPECIAL: &str = "special";

pub struct BattleContext<'a> {
    pub state: &'a mut BattleState,
    pub notifier: Option<&'a mut Box<dyn BattleNotifier>>,
}

impl<'a> BattleContext<'a> {
    pub fn new(
        state: &'a mut BattleState,
        notifier: Option<&'a mut Box<dyn BattleNotifier>>,
    ) -> Self {
        Self { state, notifier }
    }

    fn now(&self) -> f64 {
        self.state.clock.now()
    }

    fn notify(&mut self, notification: Notification) {
        if let Some(notifier) = self.notifier.as_mut() {
            notifier.notify(&notification);
        }
    }

    fn schedule(&mut self, at: f64, event: BattleEvent) -> Result<()> {
        let now = self.now();
        self.state.scheduler.schedule(at, event, now)?;
        Ok(())
    }

    fn tag(&mut self, tag: &str) {
        self.state.segments.record_tag(tag);
    }

    fn attack_policy(&self) -> TrackPolicy {
        self.state
            .player
            .profession()
            .attack_policy()
            .resolve(self.state.options.attack_policy)
    }

    fn special_policy(&self) -> TrackPolicy {
        self.state
            .player
            .profession()
            .special_policy()
            .resolve(self.state.options.special_policy)
    }

    fn enemy_index(&self, id: EncounterId) -> Option<usize> {
        self.state
            .enemies
            .iter()
            .position(|enemy| enemy.encounter_id() == id)
    }

    fn has_living_enemies(&self) -> bool {
        self.state.enemies.iter().any(|e| e.vitals().is_alive())
    }

    // ---- track (re)starts -------------------------------------------------

    /// Resume the player's tracks per policy. Tracks whose policy pauses
    /// them without enemies stay paused while the field is empty.
    pub fn resume_player_tracks(&mut self) -> Result<()> {
        if !self.state.player.vitals().is_alive() {
            return Ok(());
        }
        let now = self.now();
        let has_enemies = self.has_living_enemies();

        let attack = self.attack_policy();
        if has_enemies || !attack.pause_when_no_enemies {
            self.state.player.refresh_attack_interval();
            if let Some(next) = self.state.player.attack.resume(now, attack.start_immediately) {
                let generation = self.state.player.attack.generation();
                self.schedule(next, BattleEvent::AttackTick { generation })?;
            }
        }

        let special = self.special_policy();
        if has_enemies || !special.pause_when_no_enemies {
            if let Some(next) = self
                .state
                .player
                .special
                .resume(now, special.start_immediately)
            {
                let generation = self.state.player.special.generation();
                self.schedule(next, BattleEvent::SpecialPulse { generation })?;
            }
        }
        Ok(())
    }

    /// Start attack and skill tracks of every living enemy a full interval
    /// from now.
    pub fn start_enemy_tracks(&mut self) -> Result<()> {
        let now = self.now();
        let mut queued = Vec::new();
        for enemy in self.state.enemies.iter_mut() {
            if !enemy.vitals().is_alive() {
                continue;
            }
            let id = enemy.encounter_id();
            if let Some(next) = enemy.attack.resume(now, false) {
                queued.push((
                    next,
                    BattleEvent::EnemyAttack {
                        enemy: id,
                        generation: enemy.attack.generation(),
                    },
                ));
            }
            for (slot, next, generation) in enemy.skills.resume_all(now) {
                queued.push((
                    next,
                    BattleEvent::EnemySkillCast {
                        enemy: id,
                        slot,
                        generation,
                    },
                ));
            }
        }
        for (at, event) in queued {
            self.schedule(at, event)?;
        }
        Ok(())
    }

    fn pause_for_empty_field(&mut self) {
        if self.attack_policy().pause_when_no_enemies {
            self.state.player.attack.pause();
        }
        if self.special_policy().pause_when_no_enemies {
            self.state.player.special.pause();
        }
    }

    // ---- damage -----------------------------------------------------------

    fn deal_damage_to_enemy(
        &mut self,
        index: usize,
        hit: HitOutcome,
        source: &str,
    ) -> Result<()> {
        let now = self.now();
        let enemy = &mut self.state.enemies[index];
        if !enemy.vitals().is_alive() {
            return Ok(());
        }
        let target = enemy.encounter_id();
        let taken = enemy.receive_damage(hit.damage, now);
        let killed = !enemy.vitals().is_alive();

        self.state.totals.damage_dealt += taken;
        self.state.segments.record_damage(source, taken);
        self.notify(Notification::DamageDealt {
            at: now,
            target,
            amount: taken,
            source: source.to_string(),
            crit: hit.was_crit,
        });

        if killed {
            self.on_enemy_killed(index)?;
        }
        Ok(())
    }

    fn on_enemy_killed(&mut self, index: usize) -> Result<()> {
        let now = self.now();
        let enemy = &mut self.state.enemies[index];
        enemy.pause_tracks();
        enemy.buffs.clear();
        let id = enemy.encounter_id();
        let definition_id = enemy.definition().id.clone();

        self.state.totals.kills += 1;
        self.state.totals.drop_weighted_kills += self.state.provider.drop_multiplier();
        self.state.segments.record_kill();
        self.tag(&format!("kill:{}", definition_id));
        self.notify(Notification::EnemyKilled {
            at: now,
            enemy: id,
            definition_id,
        });

        if self.has_living_enemies() {
            // Retarget: partial swing progress is lost
            self.state.player.refresh_attack_interval();
            if let Some(next) = self.state.player.attack.reset_progress(now) {
                let generation = self.state.player.attack.generation();
                self.schedule(next, BattleEvent::AttackTick { generation })?;
            }
            Ok(())
        } else {
            self.handle_wave_cleared()
        }
    }

    fn handle_wave_cleared(&mut self) -> Result<()> {
        let now = self.now();
        // Wrappers of the old wave never carry over
        self.state.enemies.clear();
        self.state.totals.waves_cleared += 1;
        self.tag(TAG_WAVE_CLEARED);

        let advance = self.state.provider.try_advance();
        if advance.run_completed {
            self.state.totals.runs_completed += 1;
            self.tag(TAG_RUN_COMPLETED);
            let runs_completed = self.state.totals.runs_completed;
            self.notify(Notification::RunCompleted {
                at: now,
                runs_completed,
            });
        }

        self.pause_for_empty_field();

        match advance.next_group {
            Some(group) => {
                let wave_serial = group.wave_serial;
                self.state.pending_wave = Some(group);
                self.schedule(
                    now + advance.delay_seconds,
                    BattleEvent::WaveSpawn { wave_serial },
                )?;
            }
            None => {
                debug!(at = now, "encounters exhausted");
                self.tag(TAG_ENCOUNTERS_EXHAUSTED);
                self.state.player.pause_tracks();
            }
        }
        Ok(())
    }

    fn damage_player(&mut self, amount: f64, source: &str) -> Result<()> {
        let now = self.now();
        let was_alive = self.state.player.vitals().is_alive();
        let taken = self.state.player.receive_damage(amount, now);
        self.state.totals.damage_taken += taken;
        self.state.segments.record_damage_taken(taken);
        self.notify(Notification::DamageReceived {
            at: now,
            source: source.to_string(),
            amount: taken,
        });
        if was_alive && !self.state.player.vitals().is_alive() {
            self.schedule(now, BattleEvent::PlayerDeath)?;
        }
        Ok(())
    }

    fn roll_hit(&mut self, multiplier: f64) -> HitOutcome {
        let mods = self.state.player.buffs.aggregate();
        let hit = roll_player_hit(
            &mut self.state.rng,
            self.state.player.stats(),
            &mods,
            multiplier,
        );
        if hit.was_crit {
            self.tag(TAG_CRIT);
        }
        hit
    }

    // ---- event handlers ---------------------------------------------------

    pub fn on_attack_tick(&mut self, generation: u64) -> Result<bool> {
        if !self.state.player.attack.accepts(generation) || !self.state.player.can_act() {
            return Ok(false);
        }
        let now = self.now();

        match select_target(&mut self.state.rng, &self.state.enemies) {
            Some(index) => {
                let target = self.state.enemies[index].encounter_id();
                self.notify(Notification::AttackStarted { at: now, target });
                let hit = self.roll_hit(1.0);
                // On-hit buffs land before a kill can restart the swing
                if let Some(buff) = self.state.player.profession().on_attack_hit() {
                    let state = &mut *self.state;
                    state.player.buffs.apply(&buff, now, Some(&mut state.segments));
                }
                self.deal_damage_to_enemy(index, hit, SOURCE_ATTACK)?;
            }
            None => {
                if self.attack_policy().pause_when_no_enemies {
                    self.state.player.attack.pause();
                    return Ok(true);
                }
            }
        }

        // A kill may have paused or restarted the track already
        if self.state.player.attack.accepts(generation) {
            self.state.player.refresh_attack_interval();
            let next = self.state.player.attack.fire(now)?;
            self.schedule(next, BattleEvent::AttackTick { generation })?;
        }
        Ok(true)
    }

    pub fn on_special_pulse(&mut self, generation: u64) -> Result<bool> {
        if !self.state.player.special.accepts(generation) || !self.state.player.can_act() {
            return Ok(false);
        }
        let now = self.now();

        let mut found_target = true;
        match self.state.player.profession().special_action() {
            SpecialAction::SelfBuff(buff) => {
                let state = &mut *self.state;
                state.player.buffs.apply(&buff, now, Some(&mut state.segments));
                state.player.refresh_attack_interval();
            }
            SpecialAction::Strike { multiplier } => {
                match select_target(&mut self.state.rng, &self.state.enemies) {
                    Some(index) => {
                        let hit = self.roll_hit(multiplier);
                        self.deal_damage_to_enemy(index, hit, SOURCE_SPECIAL)?;
                    }
                    None => found_target = false,
                }
            }
            SpecialAction::Volley { multiplier } => {
                let targets: Vec<EncounterId> = self
                    .state
                    .enemies
                    .iter()
                    .filter(|e| e.can_be_targeted())
                    .map(EnemyCombatant::encounter_id)
                    .collect();
                found_target = !targets.is_empty();
                for id in targets {
                    // An earlier arrow may have cleared the wave
                    let Some(index) = self.enemy_index(id) else {
                        continue;
                    };
                    if !self.state.enemies[index].can_be_targeted() {
                        continue;
                    }
                    let hit = self.roll_hit(multiplier);
                    self.deal_damage_to_enemy(index, hit, SOURCE_SPECIAL)?;
                }
            }
        }

        if !found_target {
            self.tag(TAG_SPECIAL_NO_TARGET);
            if self.special_policy().pause_when_no_enemies {
                self.state.player.special.pause();
                return Ok(true);
            }
        }

        if self.state.player.special.accepts(generation) {
            let next = self.state.player.special.fire(now)?;
            self.schedule(next, BattleEvent::SpecialPulse { generation })?;
        }
        Ok(true)
    }

    pub fn on_enemy_attack(&mut self, enemy: EncounterId, generation: u64) -> Result<bool> {
        let Some(index) = self.enemy_index(enemy) else {
            return Ok(false);
        };
        let attacker = &self.state.enemies[index];
        if !attacker.attack.accepts(generation)
            || !attacker.can_act()
            || !self.state.player.can_be_targeted()
        {
            return Ok(false);
        }
        let now = self.now();

        let reduction = player_damage_reduction(
            self.state.player.stats(),
            &self.state.player.buffs.aggregate(),
        );
        let damage = enemy_hit_damage(
            attacker.definition().damage,
            &attacker.buffs.aggregate(),
            reduction,
        );
        let source = attacker.definition().id.clone();
        self.damage_player(damage, &source)?;

        if self.state.player.vitals().is_alive() {
            let attacker = &mut self.state.enemies[index];
            if attacker.attack.accepts(generation) {
                let next = attacker.attack.fire(now)?;
                self.schedule(next, BattleEvent::EnemyAttack { enemy, generation })?;
            }
        }
        Ok(true)
    }

    pub fn on_enemy_skill_cast(
        &mut self,
        enemy: EncounterId,
        slot: usize,
        generation: u64,
    ) -> Result<bool> {
        let Some(index) = self.enemy_index(enemy) else {
            return Ok(false);
        };
        let caster = &self.state.enemies[index];
        let Some(skill) = caster.skills.slot(slot) else {
            return Ok(false);
        };
        if !skill.track.accepts(generation)
            || !caster.can_act()
            || !self.state.player.can_be_targeted()
        {
            return Ok(false);
        }
        let now = self.now();
        let definition = skill.definition.clone();
        let hp_fraction = caster.vitals().hp_fraction();

        if definition.trigger.is_met(hp_fraction) {
            let activated =
                definition.chance >= 1.0 || self.state.rng.next_bool(definition.chance);
            if activated {
                self.tag(&format!("skill:{}", definition.id));
                match &definition.effect {
                    SkillEffect::Strike { multiplier } => {
                        let caster = &self.state.enemies[index];
                        let reduction = player_damage_reduction(
                            self.state.player.stats(),
                            &self.state.player.buffs.aggregate(),
                        );
                        let damage = enemy_hit_damage(
                            caster.definition().damage * multiplier,
                            &caster.buffs.aggregate(),
                            reduction,
                        );
                        self.damage_player(damage, &definition.id)?;
                    }
                    SkillEffect::ApplyBuff(buff) => {
                        let state = &mut *self.state;
                        state.enemies[index]
                            .buffs
                            .apply(buff, now, Some(&mut state.segments));
                    }
                    SkillEffect::Heal { fraction } => {
                        let vitals = self.state.enemies[index].vitals_mut();
                        let amount = vitals.max_hp() * fraction;
                        vitals.heal(amount);
                    }
                }
            }
        }

        if self.state.player.vitals().is_alive() {
            if let Some(skill) = self.state.enemies[index].skills.slot_mut(slot) {
                if skill.track.accepts(generation) {
                    let next = skill.track.fire(now)?;
                    self.schedule(
                        next,
                        BattleEvent::EnemySkillCast {
                            enemy,
                            slot,
                            generation,
                        },
                    )?;
                }
            }
        }
        Ok(true)
    }

    pub fn on_player_death(&mut self) -> Result<bool> {
        if self.state.player.vitals().is_alive() {
            return Ok(false);
        }
        let now = self.now();
        self.state.totals.deaths += 1;
        self.tag(TAG_PLAYER_DEATH);
        self.notify(Notification::PlayerDied { at: now });

        self.state.player.pause_tracks();
        for enemy in &mut self.state.enemies {
            enemy.pause_tracks();
        }

        let policy = self.state.provider.death_policy();
        debug!(at = now, ?policy, "player died");
        match policy {
            DeathPolicy::AutoRevive => {
                let died_at = self.state.player.vitals().death_time().unwrap_or(now);
                let revive_at = died_at + self.state.options.revive_duration_seconds;
                self.state.player.vitals_mut().set_revive_at(Some(revive_at));
                self.schedule(revive_at, BattleEvent::PlayerRevive)?;
            }
            DeathPolicy::ResetRun => {
                self.state.totals.dungeon_resets += 1;
                self.tag(TAG_DUNGEON_RESET);
                self.state.enemies.clear();
                let advance = self.state.provider.reset_run();
                let revive_at = now + advance.delay_seconds;
                self.state.player.vitals_mut().set_revive_at(Some(revive_at));
                // Revive is queued first so the player is up when the wave lands
                self.schedule(revive_at, BattleEvent::PlayerRevive)?;
                match advance.next_group {
                    Some(group) => {
                        let wave_serial = group.wave_serial;
                        self.state.pending_wave = Some(group);
                        self.schedule(revive_at, BattleEvent::WaveSpawn { wave_serial })?;
                    }
                    None => self.state.pending_wave = None,
                }
            }
            DeathPolicy::Defeat => {
                self.tag(TAG_PLAYER_DEFEATED);
            }
        }
        Ok(true)
    }

    pub fn on_player_revive(&mut self) -> Result<bool> {
        if self.state.player.vitals().is_alive() {
            return Ok(false);
        }
        let now = self.now();
        self.state.player.revive()?;
        self.state.totals.revives += 1;
        self.tag(TAG_PLAYER_REVIVE);
        self.notify(Notification::PlayerRevived { at: now });
        debug!(at = now, "player revived");

        self.start_enemy_tracks()?;
        self.resume_player_tracks()?;
        Ok(true)
    }

    pub fn on_wave_spawn(&mut self, wave_serial: u64) -> Result<bool> {
        let matches = self
            .state
            .pending_wave
            .as_ref()
            .map_or(false, |group| group.wave_serial == wave_serial);
        if !matches {
            return Ok(false);
        }
        let Some(group) = self.state.pending_wave.take() else {
            return Ok(false);
        };
        let now = self.now();
        let wave_index = group.wave_index;

        // Fresh wrappers: tracks, buffs and skills never leak across waves
        self.state.enemies = group
            .encounters
            .into_iter()
            .map(EnemyCombatant::bind)
            .collect();
        let enemies = self.state.enemies.len();
        debug!(at = now, wave_index, enemies, "wave spawned");
        self.notify(Notification::WaveSpawned {
            at: now,
            wave_index,
            enemies,
        });

        if self.state.player.vitals().is_alive() {
            self.start_enemy_tracks()?;
            self.resume_player_tracks()?;
        }
        Ok(true)
    }
}
