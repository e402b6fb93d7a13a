//! Professions: attack cadence, special action, and track policy overrides.

use crate::combat::buff::{BuffDefinition, StatModifiers};
use crate::core::config::TrackPolicyOverride;
use crate::core::constants::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProfessionId {
    Warrior,
    Ranger,
    Mage,
}

impl ProfessionId {
    pub const ALL: [ProfessionId; 3] = [
        ProfessionId::Warrior,
        ProfessionId::Ranger,
        ProfessionId::Mage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProfessionId::Warrior => "warrior",
            ProfessionId::Ranger => "ranger",
            ProfessionId::Mage => "mage",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(name))
    }
}

/// What the special track does when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialAction {
    /// One weighted-target hit at `multiplier` × attack power
    Strike { multiplier: f64 },
    /// Hit every living enemy at `multiplier` × attack power
    Volley { multiplier: f64 },
    /// Apply a buff to the player; needs no target
    SelfBuff(BuffDefinition),
}

impl SpecialAction {
    pub fn needs_target(&self) -> bool {
        !matches!(self, SpecialAction::SelfBuff(_))
    }
}

pub trait Profession: Send + Sync {
    fn id(&self) -> ProfessionId;
    fn base_attack_interval(&self) -> f64;
    fn base_special_interval(&self) -> f64;
    fn special_action(&self) -> SpecialAction;

    fn attack_policy(&self) -> TrackPolicyOverride {
        TrackPolicyOverride::default()
    }

    fn special_policy(&self) -> TrackPolicyOverride {
        TrackPolicyOverride::default()
    }

    /// Buff applied to the player after each landed auto-attack.
    fn on_attack_hit(&self) -> Option<BuffDefinition> {
        None
    }
}

pub struct Warrior;
pub struct Ranger;
pub struct Mage;

impl Profession for Warrior {
    fn id(&self) -> ProfessionId {
        ProfessionId::Warrior
    }

    fn base_attack_interval(&self) -> f64 {
        WARRIOR_ATTACK_INTERVAL
    }

    fn base_special_interval(&self) -> f64 {
        WARRIOR_SPECIAL_INTERVAL
    }

    fn special_action(&self) -> SpecialAction {
        SpecialAction::SelfBuff(BuffDefinition {
            id: "battle_shout".to_string(),
            duration: 8.0,
            max_stacks: 1,
            per_stack: StatModifiers {
                damage_multiplier_physical: 0.3,
                damage_reduction: 0.1,
                ..Default::default()
            },
        })
    }

    // The shout keeps pulsing between waves
    fn special_policy(&self) -> TrackPolicyOverride {
        TrackPolicyOverride {
            start_immediately: None,
            pause_when_no_enemies: Some(false),
        }
    }

    fn on_attack_hit(&self) -> Option<BuffDefinition> {
        Some(BuffDefinition {
            id: "momentum".to_string(),
            duration: 6.0,
            max_stacks: 5,
            per_stack: StatModifiers {
                haste_percent: 4.0,
                ..Default::default()
            },
        })
    }
}

impl Profession for Ranger {
    fn id(&self) -> ProfessionId {
        ProfessionId::Ranger
    }

    fn base_attack_interval(&self) -> f64 {
        RANGER_ATTACK_INTERVAL
    }

    fn base_special_interval(&self) -> f64 {
        RANGER_SPECIAL_INTERVAL
    }

    fn special_action(&self) -> SpecialAction {
        SpecialAction::Volley { multiplier: 0.6 }
    }

    fn special_policy(&self) -> TrackPolicyOverride {
        TrackPolicyOverride {
            start_immediately: Some(true),
            pause_when_no_enemies: None,
        }
    }
}

impl Profession for Mage {
    fn id(&self) -> ProfessionId {
        ProfessionId::Mage
    }

    fn base_attack_interval(&self) -> f64 {
        MAGE_ATTACK_INTERVAL
    }

    fn base_special_interval(&self) -> f64 {
        MAGE_SPECIAL_INTERVAL
    }

    fn special_action(&self) -> SpecialAction {
        SpecialAction::Strike { multiplier: 2.5 }
    }
}

static WARRIOR: Warrior = Warrior;
static RANGER: Ranger = Ranger;
static MAGE: Mage = Mage;

/// Look up the profession implementation for an id.
pub fn profession(id: ProfessionId) -> &'static dyn Profession {
    match id {
        ProfessionId::Warrior => &WARRIOR,
        ProfessionId::Ranger => &RANGER,
        ProfessionId::Mage => &MAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TrackPolicy;

    #[test]
    fn test_registry_returns_matching_id() {
        for id in ProfessionId::ALL {
            assert_eq!(profession(id).id(), id);
        }
    }

    #[test]
    fn test_from_name_case_insensitive() {
        assert_eq!(ProfessionId::from_name("Ranger"), Some(ProfessionId::Ranger));
        assert_eq!(ProfessionId::from_name("MAGE"), Some(ProfessionId::Mage));
        assert_eq!(ProfessionId::from_name("bard"), None);
    }

    #[test]
    fn test_intervals_positive() {
        for id in ProfessionId::ALL {
            let p = profession(id);
            assert!(p.base_attack_interval() > 0.0);
            assert!(p.base_special_interval() > 0.0);
        }
    }

    #[test]
    fn test_ranger_special_overrides_global_policy() {
        let global = TrackPolicy::default();
        let resolved = profession(ProfessionId::Ranger)
            .special_policy()
            .resolve(global);
        assert!(resolved.start_immediately);
        assert!(resolved.pause_when_no_enemies);
    }

    #[test]
    fn test_only_self_buff_needs_no_target() {
        assert!(!profession(ProfessionId::Warrior).special_action().needs_target());
        assert!(profession(ProfessionId::Ranger).special_action().needs_target());
        assert!(profession(ProfessionId::Mage).special_action().needs_target());
    }
}
