//! Player and enemy combatants.

use super::buff::{BuffManager, BuffOwner};
use super::logic::haste_adjusted_interval;
use super::skill::SkillManager;
use super::track::{Track, TrackKind};
use super::types::{CombatantId, LifeState, Vitals};
use crate::character::profession::{profession, Profession, ProfessionId};
use crate::character::profile::{CharacterProfile, CharacterStats};
use crate::core::error::Result;
use crate::encounter::types::{Encounter, EncounterId, EnemyDefinition};
use serde::{Deserialize, Serialize};

/// Anything that can take part in a fight.
pub trait Combatant {
    fn id(&self) -> CombatantId;
    fn name(&self) -> &str;
    fn vitals(&self) -> &Vitals;
    fn vitals_mut(&mut self) -> &mut Vitals;
    fn threat_weight(&self) -> f64;
    fn buffs(&self) -> &BuffManager;

    fn life_state(&self) -> LifeState {
        self.vitals().life()
    }

    fn can_act(&self) -> bool {
        self.vitals().is_alive()
    }

    fn can_be_targeted(&self) -> bool {
        self.vitals().is_alive()
    }

    /// Returns the damage actually taken; 0 for the dead.
    fn receive_damage(&mut self, amount: f64, now: f64) -> f64 {
        self.vitals_mut().receive_damage(amount, now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCombatant {
    name: String,
    profession: ProfessionId,
    stats: CharacterStats,
    vitals: Vitals,
    threat_weight: f64,
    pub buffs: BuffManager,
    pub attack: Track,
    pub special: Track,
}

impl PlayerCombatant {
    pub fn from_profile(profile: &CharacterProfile) -> Self {
        let prof = profession(profile.profession);
        Self {
            name: profile.name.clone(),
            profession: profile.profession,
            stats: profile.stats,
            vitals: Vitals::new(profile.stats.max_hp()),
            threat_weight: 1.0,
            buffs: BuffManager::new(BuffOwner::Player),
            attack: Track::new(
                TrackKind::Attack,
                haste_adjusted_interval(
                    prof.base_attack_interval(),
                    &profile.stats,
                    &Default::default(),
                ),
            ),
            special: Track::new(TrackKind::Special, prof.base_special_interval()),
        }
    }

    pub fn profession_id(&self) -> ProfessionId {
        self.profession
    }

    pub fn profession(&self) -> &'static dyn Profession {
        profession(self.profession)
    }

    pub fn stats(&self) -> &CharacterStats {
        &self.stats
    }

    /// Attack interval under the current buffs.
    pub fn attack_interval(&self) -> f64 {
        haste_adjusted_interval(
            self.profession().base_attack_interval(),
            &self.stats,
            &self.buffs.aggregate(),
        )
    }

    pub fn refresh_attack_interval(&mut self) {
        let interval = self.attack_interval();
        self.attack.set_interval(interval);
    }

    pub fn pause_tracks(&mut self) {
        self.attack.pause();
        self.special.pause();
    }

    pub fn set_threat_weight(&mut self, weight: f64) {
        assert!(weight >= 0.0, "threat weight must be non-negative, got {}", weight);
        self.threat_weight = weight;
    }

    /// Check invariants on a player loaded from outside.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.vitals.validate()?;
        if !(self.threat_weight >= 0.0) {
            return Err(format!("threat weight {} is invalid", self.threat_weight));
        }
        self.attack.validate()?;
        self.special.validate()?;
        self.buffs.validate()
    }

    /// Restore full HP and drop all buffs. Tracks are left to the caller.
    pub fn revive(&mut self) -> Result<()> {
        self.vitals.revive()?;
        self.buffs.clear();
        self.refresh_attack_interval();
        Ok(())
    }
}

impl Combatant for PlayerCombatant {
    fn id(&self) -> CombatantId {
        CombatantId::Player
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn threat_weight(&self) -> f64 {
        self.threat_weight
    }

    fn buffs(&self) -> &BuffManager {
        &self.buffs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyCombatant {
    encounter: Encounter,
    threat_weight: f64,
    pub buffs: BuffManager,
    pub attack: Track,
    pub skills: SkillManager,
}

impl EnemyCombatant {
    /// Wrap a freshly spawned encounter. Tracks start paused.
    pub fn bind(encounter: Encounter) -> Self {
        let attack = Track::new(TrackKind::Attack, encounter.definition.attack_interval);
        let skills = SkillManager::new(&encounter.definition.skills);
        let threat_weight = encounter.definition.threat_weight;
        Self {
            encounter,
            threat_weight,
            buffs: BuffManager::new(BuffOwner::Enemy),
            attack,
            skills,
        }
    }

    pub fn encounter_id(&self) -> EncounterId {
        self.encounter.id
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn definition(&self) -> &EnemyDefinition {
        &self.encounter.definition
    }

    pub fn pause_tracks(&mut self) {
        self.attack.pause();
        self.skills.pause_all();
    }

    /// Override the weight this enemy was spawned with.
    pub fn set_threat_weight(&mut self, weight: f64) {
        assert!(weight >= 0.0, "threat weight must be non-negative, got {}", weight);
        self.threat_weight = weight;
    }

    /// Check invariants on an enemy loaded from outside.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.definition().validate()?;
        self.encounter.vitals.validate()?;
        if !(self.threat_weight >= 0.0) {
            return Err(format!("threat weight {} is invalid", self.threat_weight));
        }
        self.attack.validate()?;
        self.skills.validate()?;
        self.buffs.validate()
    }
}

impl Combatant for EnemyCombatant {
    fn id(&self) -> CombatantId {
        CombatantId::Enemy(self.encounter.id)
    }

    fn name(&self) -> &str {
        &self.encounter.definition.name
    }

    fn vitals(&self) -> &Vitals {
        &self.encounter.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.encounter.vitals
    }

    fn threat_weight(&self) -> f64 {
        self.threat_weight
    }

    fn buffs(&self) -> &BuffManager {
        &self.buffs
    }
}
