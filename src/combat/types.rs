use crate::core::error::{BattleError, Result};
use crate::encounter::types::EncounterId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Dead,
}

/// Who a combat action came from or went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantId {
    Player,
    Enemy(EncounterId),
}

/// Hit points plus the death/revive bookkeeping shared by every combatant.
///
/// Invariant: `life == Dead` iff `current_hp == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    max_hp: f64,
    current_hp: f64,
    life: LifeState,
    death_time: Option<f64>,
    revive_at: Option<f64>,
}

impl Vitals {
    pub fn new(max_hp: f64) -> Self {
        assert!(max_hp > 0.0, "max_hp must be positive, got {}", max_hp);
        Self {
            max_hp,
            current_hp: max_hp,
            life: LifeState::Alive,
            death_time: None,
            revive_at: None,
        }
    }

    pub fn max_hp(&self) -> f64 {
        self.max_hp
    }

    pub fn current_hp(&self) -> f64 {
        self.current_hp
    }

    pub fn hp_fraction(&self) -> f64 {
        self.current_hp / self.max_hp
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn death_time(&self) -> Option<f64> {
        self.death_time
    }

    pub fn revive_at(&self) -> Option<f64> {
        self.revive_at
    }

    pub fn set_revive_at(&mut self, at: Option<f64>) {
        self.revive_at = at;
    }

    /// Apply damage and return the amount actually taken.
    ///
    /// Dead combatants take nothing. Lethal damage flips the state to
    /// `Dead` and stamps `death_time`.
    pub fn receive_damage(&mut self, amount: f64, now: f64) -> f64 {
        assert!(amount >= 0.0, "damage must be non-negative, got {}", amount);
        if !self.is_alive() {
            return 0.0;
        }
        if amount >= self.current_hp {
            let taken = self.current_hp;
            self.current_hp = 0.0;
            self.life = LifeState::Dead;
            self.death_time = Some(now);
            taken
        } else {
            self.current_hp -= amount;
            amount
        }
    }

    /// Heal a living combatant, capped at max HP. Returns the amount healed.
    pub fn heal(&mut self, amount: f64) -> f64 {
        assert!(amount >= 0.0, "heal must be non-negative, got {}", amount);
        if !self.is_alive() {
            return 0.0;
        }
        let healed = amount.min(self.max_hp - self.current_hp);
        self.current_hp += healed;
        healed
    }

    pub fn revive(&mut self) -> Result<()> {
        if self.is_alive() {
            return Err(BattleError::InvalidStateTransition(
                "cannot revive a living combatant".to_string(),
            ));
        }
        self.current_hp = self.max_hp;
        self.life = LifeState::Alive;
        self.death_time = None;
        self.revive_at = None;
        Ok(())
    }

    /// Check invariants on state loaded from outside.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.max_hp > 0.0) {
            return Err(format!("max_hp must be positive, got {}", self.max_hp));
        }
        if !(0.0..=self.max_hp).contains(&self.current_hp) {
            return Err(format!(
                "current_hp {} outside [0, {}]",
                self.current_hp, self.max_hp
            ));
        }
        let dead = self.life == LifeState::Dead;
        if dead != (self.current_hp == 0.0) {
            return Err(format!(
                "life state {:?} inconsistent with hp {}",
                self.life, self.current_hp
            ));
        }
        if !dead && (self.death_time.is_some() || self.revive_at.is_some()) {
            return Err("living combatant carries death bookkeeping".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vitals_full_hp() {
        let vitals = Vitals::new(50.0);
        assert_eq!(vitals.current_hp(), 50.0);
        assert!(vitals.is_alive());
        assert!(vitals.death_time().is_none());
    }

    #[test]
    fn test_receive_damage_partial() {
        let mut vitals = Vitals::new(50.0);
        assert_eq!(vitals.receive_damage(20.0, 1.0), 20.0);
        assert_eq!(vitals.current_hp(), 30.0);
        assert!(vitals.is_alive());
    }

    #[test]
    fn test_lethal_damage_kills_and_clamps() {
        let mut vitals = Vitals::new(50.0);
        let taken = vitals.receive_damage(80.0, 4.5);
        assert_eq!(taken, 50.0);
        assert_eq!(vitals.current_hp(), 0.0);
        assert_eq!(vitals.life(), LifeState::Dead);
        assert_eq!(vitals.death_time(), Some(4.5));
    }

    #[test]
    fn test_dead_takes_no_damage() {
        let mut vitals = Vitals::new(10.0);
        vitals.receive_damage(10.0, 1.0);
        assert_eq!(vitals.receive_damage(5.0, 2.0), 0.0);
        assert_eq!(vitals.death_time(), Some(1.0));
    }

    #[test]
    fn test_revive_restores_and_clears_bookkeeping() {
        let mut vitals = Vitals::new(10.0);
        vitals.receive_damage(10.0, 1.0);
        vitals.set_revive_at(Some(11.0));
        vitals.revive().unwrap();
        assert_eq!(vitals.current_hp(), 10.0);
        assert!(vitals.is_alive());
        assert!(vitals.death_time().is_none());
        assert!(vitals.revive_at().is_none());
    }

    #[test]
    fn test_revive_living_is_rejected() {
        let mut vitals = Vitals::new(10.0);
        assert!(matches!(
            vitals.revive(),
            Err(BattleError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut vitals = Vitals::new(10.0);
        vitals.receive_damage(4.0, 0.0);
        assert_eq!(vitals.heal(10.0), 4.0);
        assert_eq!(vitals.current_hp(), 10.0);
    }

    #[test]
    fn test_validate_catches_inconsistent_life() {
        let mut vitals = Vitals::new(10.0);
        vitals.receive_damage(10.0, 0.0);
        assert!(vitals.validate().is_ok());
        let json = serde_json::to_string(&vitals)
            .unwrap()
            .replace("\"Dead\"", "\"Alive\"");
        let tampered: Vitals = serde_json::from_str(&json).unwrap();
        assert!(tampered.validate().is_err());
    }
}
