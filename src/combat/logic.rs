use super::buff::StatModifiers;
use crate::character::profile::CharacterStats;
use crate::core::constants::*;
use crate::core::rng::RngContext;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: f64,
    pub was_crit: bool,
}

/// Attack speed multiplier from stats plus buffs, floored at `MIN_HASTE_FACTOR`.
pub fn haste_factor(stats: &CharacterStats, mods: &StatModifiers) -> f64 {
    (1.0 + (stats.haste_percent + mods.haste_percent) / 100.0).max(MIN_HASTE_FACTOR)
}

/// Profession base interval divided by the haste factor.
pub fn haste_adjusted_interval(base: f64, stats: &CharacterStats, mods: &StatModifiers) -> f64 {
    base / haste_factor(stats, mods)
}

/// Roll one player hit. Always consumes exactly one draw (the crit roll),
/// even when crit chance is 0 or 1.
pub fn roll_player_hit(
    rng: &mut RngContext,
    stats: &CharacterStats,
    mods: &StatModifiers,
    multiplier: f64,
) -> HitOutcome {
    let crit_chance = (stats.crit_chance + mods.crit_chance).clamp(0.0, 1.0);
    let was_crit = rng.next_bool(crit_chance);

    let damage_multiplier = (1.0 + mods.damage_multiplier_physical).max(0.0);
    let mut damage = stats.attack_power * damage_multiplier * multiplier;
    if was_crit {
        damage *= stats.crit_multiplier;
    }
    HitOutcome {
        damage: damage.max(0.0),
        was_crit,
    }
}

/// Incoming damage reduction: armor / (armor + divisor) plus buffs, capped.
pub fn player_damage_reduction(stats: &CharacterStats, mods: &StatModifiers) -> f64 {
    let from_armor = stats.armor / (stats.armor + ARMOR_REDUCTION_DIVISOR);
    (from_armor + mods.damage_reduction).clamp(0.0, MAX_DAMAGE_REDUCTION)
}

/// Damage an enemy hit deals after its own buffs and the player's reduction.
pub fn enemy_hit_damage(base: f64, enemy_mods: &StatModifiers, reduction: f64) -> f64 {
    let multiplier = (1.0 + enemy_mods.damage_multiplier_physical).max(0.0);
    (base * multiplier * (1.0 - reduction)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> CharacterStats {
        CharacterStats {
            attack_power: 20.0,
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            haste_percent: 0.0,
            stamina: 10.0,
            armor: 0.0,
        }
    }

    #[test]
    fn test_roll_consumes_one_draw_even_without_crit_chance() {
        let mut rng = RngContext::new(3);
        let hit = roll_player_hit(&mut rng, &stats(), &StatModifiers::default(), 1.0);
        assert_eq!(rng.index(), 1);
        assert!(!hit.was_crit);
        assert_eq!(hit.damage, 20.0);
    }

    #[test]
    fn test_guaranteed_crit_applies_multiplier() {
        let mut rng = RngContext::new(3);
        let s = CharacterStats {
            crit_chance: 1.0,
            ..stats()
        };
        let hit = roll_player_hit(&mut rng, &s, &StatModifiers::default(), 1.5);
        assert!(hit.was_crit);
        assert_eq!(hit.damage, 60.0);
    }

    #[test]
    fn test_buff_multiplier_scales_damage() {
        let mut rng = RngContext::new(3);
        let mods = StatModifiers {
            damage_multiplier_physical: 0.5,
            ..Default::default()
        };
        let hit = roll_player_hit(&mut rng, &stats(), &mods, 1.0);
        assert_eq!(hit.damage, 30.0);
    }

    #[test]
    fn test_haste_shortens_interval_with_floor() {
        let s = CharacterStats {
            haste_percent: 100.0,
            ..stats()
        };
        assert_eq!(haste_adjusted_interval(2.0, &s, &StatModifiers::default()), 1.0);

        let slowed = CharacterStats {
            haste_percent: -500.0,
            ..stats()
        };
        assert_eq!(
            haste_adjusted_interval(2.0, &slowed, &StatModifiers::default()),
            2.0 / MIN_HASTE_FACTOR
        );
    }

    #[test]
    fn test_damage_reduction_capped() {
        let s = CharacterStats {
            armor: 100.0,
            ..stats()
        };
        assert_eq!(player_damage_reduction(&s, &StatModifiers::default()), 0.5);

        let mods = StatModifiers {
            damage_reduction: 0.9,
            ..Default::default()
        };
        assert_eq!(player_damage_reduction(&s, &mods), MAX_DAMAGE_REDUCTION);
    }

    #[test]
    fn test_enemy_hit_damage_applies_reduction() {
        assert_eq!(enemy_hit_damage(10.0, &StatModifiers::default(), 0.25), 7.5);
    }
}
