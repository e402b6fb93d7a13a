//! Integration test: Offline fast-forward and recovery
//!
//! Offline catch-up runs the same loop as live play, so settling a plan
//! must reproduce the online battle exactly, whether it is settled in one
//! go or in several chunks through snapshots. Corrupt snapshots are
//! rejected and never stop a recovery batch.

use chrono::{DateTime, Duration, TimeZone, Utc};
use idle_battle::battle::engine::{BattleEngine, BattleSetup};
use idle_battle::battle::segment::CombatSegment;
use idle_battle::battle::snapshot;
use idle_battle::battle::state::BattleState;
use idle_battle::character::profession::ProfessionId;
use idle_battle::character::profile::{CharacterProfile, CharacterStats};
use idle_battle::core::config::CombatLoopOptions;
use idle_battle::core::error::BattleError;
use idle_battle::encounter::presets;
use idle_battle::encounter::provider::EncounterSource;
use idle_battle::offline::{
    recover_offline_plans, ActivityPlan, OfflineFastForwardEngine, PlanDuration, PlanStatus,
};
use std::collections::HashMap;
use uuid::Uuid;

const TWELVE_HOURS: f64 = 12.0 * 3600.0;

fn adventurer() -> CharacterProfile {
    CharacterProfile::new(
        "Away",
        ProfessionId::Ranger,
        CharacterStats {
            attack_power: 25.0,
            stamina: 40.0,
            armor: 50.0,
            crit_chance: 0.15,
            ..Default::default()
        },
    )
}

fn crypt_setup(seed: u64) -> BattleSetup {
    BattleSetup {
        seed,
        encounters: EncounterSource::dungeon(presets::sunken_crypt()),
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn online_run(setup: &BattleSetup, hero: &CharacterProfile, end: f64, step: f64) -> BattleEngine {
    let mut engine =
        BattleEngine::new(Uuid::new_v4(), setup, hero, CombatLoopOptions::default()).unwrap();
    let mut t = 0.0;
    while t < end {
        t = (t + step).min(end);
        while !engine.advance_until(t).unwrap().reached_target {}
    }
    engine
}

fn tamper_kills(json: &str) -> String {
    let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
    let kills = value["state"]["totals"]["kills"].as_u64().unwrap();
    value["state"]["totals"]["kills"] = serde_json::json!(kills + 1000);
    value.to_string()
}

/// Re-seal a snapshot with a broken special interval and a valid checksum.
fn reseal_with_special_interval(json: &str, interval: f64) -> String {
    let state = snapshot::decode(json).unwrap();
    let mut value = serde_json::to_value(&state).unwrap();
    value["player"]["special"]["current_interval"] = serde_json::json!(interval);
    let state: BattleState = serde_json::from_value(value).unwrap();
    snapshot::encode(&state).unwrap()
}

#[test]
fn test_offline_settlement_matches_online_play() {
    let hero = adventurer();
    let setup = crypt_setup(9001);

    let mut online = online_run(&setup, &hero, 3600.0, 1.0);
    online.flush_segments();
    let online_segments = online.drain_segments();

    let mut plan = ActivityPlan::new(
        hero.id,
        PlanDuration::Finite { seconds: 3600.0 },
        setup,
        epoch(),
    );
    let offline = OfflineFastForwardEngine::new(CombatLoopOptions::default());
    let settlement = offline
        .fast_forward(&hero, &mut plan, 5000.0, TWELVE_HOURS)
        .unwrap();

    assert!(settlement.completed);
    assert_eq!(settlement.simulated_seconds, 3600.0);
    assert_eq!(settlement.rng_index_start, 0);
    assert_eq!(settlement.rng_index_end, online.seed_index_end());
    assert_eq!(&settlement.totals, online.totals());
    assert_eq!(settlement.segments, online_segments);
    assert!(settlement.kills() > 0);

    assert_eq!(plan.status, PlanStatus::Completed);
    assert!(plan.battle_state_json.is_none());
}

#[test]
fn test_chunked_settlements_match_one_long_battle() {
    let hero = adventurer();
    let setup = crypt_setup(17);
    let mut online = online_run(&setup, &hero, 3000.0, 2.5);
    let online_segments = online.drain_segments();

    let mut plan = ActivityPlan::new(hero.id, PlanDuration::Infinite, setup, epoch());
    let offline = OfflineFastForwardEngine::default();
    let mut segments: Vec<CombatSegment> = Vec::new();
    let mut kills = 0;
    let mut damage = 0.0;
    let mut last_rng_end = 0;
    for chunk in [1000.0, 250.0, 1750.0] {
        let settlement = offline
            .fast_forward(&hero, &mut plan, chunk, TWELVE_HOURS)
            .unwrap();
        assert!(!settlement.completed);
        assert_eq!(settlement.rng_index_start, last_rng_end);
        last_rng_end = settlement.rng_index_end;
        kills += settlement.totals.kills;
        damage += settlement.totals.damage_dealt;
        segments.extend(settlement.segments);
        assert!(plan.battle_state_json.is_some());
    }

    assert_eq!(plan.executed_seconds, 3000.0);
    assert_eq!(last_rng_end, online.seed_index_end());
    assert_eq!(kills, online.totals().kills);
    assert!((damage - online.totals().damage_dealt).abs() < 1e-6);
    assert_eq!(segments, online_segments);
}

#[test]
fn test_plan_arithmetic_respects_remaining_and_cap() {
    let hero = adventurer();
    let mut plan = ActivityPlan::new(
        hero.id,
        PlanDuration::Finite { seconds: 100.0 },
        crypt_setup(1),
        epoch(),
    );
    let offline = OfflineFastForwardEngine::default();

    let first = offline.fast_forward(&hero, &mut plan, 30.0, 1000.0).unwrap();
    assert_eq!(first.simulated_seconds, 30.0);
    assert_eq!(plan.remaining_seconds(), Some(70.0));

    let capped = offline.fast_forward(&hero, &mut plan, 500.0, 40.0).unwrap();
    assert_eq!(capped.simulated_seconds, 40.0);
    assert!(!capped.completed);

    let last = offline.fast_forward(&hero, &mut plan, 1000.0, 1000.0).unwrap();
    assert_eq!(last.simulated_seconds, 30.0);
    assert!(last.completed);
    assert_eq!(plan.executed_seconds, 100.0);

    let again = offline.fast_forward(&hero, &mut plan, 10.0, 1000.0);
    assert!(matches!(again, Err(BattleError::InvalidStateTransition(_))));
}

#[test]
fn test_negative_offline_time_settles_nothing() {
    let hero = adventurer();
    let mut plan = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(2), epoch());
    assert_eq!(plan.simulatable_seconds(-30.0, 1000.0), 0.0);

    let settlement = OfflineFastForwardEngine::default()
        .fast_forward(&hero, &mut plan, -30.0, 1000.0)
        .unwrap();
    assert_eq!(settlement.simulated_seconds, 0.0);
    assert_eq!(plan.executed_seconds, 0.0);
    assert!(plan.is_running());
}

#[test]
fn test_plan_for_other_character_is_rejected() {
    let hero = adventurer();
    let stranger = adventurer();
    let mut plan = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(3), epoch());
    let result = OfflineFastForwardEngine::default().fast_forward(&stranger, &mut plan, 60.0, 60.0);
    assert!(matches!(result, Err(BattleError::DataIntegrityViolation(_))));
}

#[test]
fn test_tampered_snapshot_is_rejected() {
    let hero = adventurer();
    let mut plan = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(4), epoch());
    let offline = OfflineFastForwardEngine::default();
    offline.fast_forward(&hero, &mut plan, 300.0, TWELVE_HOURS).unwrap();
    let json = plan.battle_state_json.clone().unwrap();

    // Untouched snapshot still loads
    assert!(BattleEngine::restore(&json, CombatLoopOptions::default()).is_ok());

    let forged = tamper_kills(&json);
    let err = BattleEngine::restore(&forged, CombatLoopOptions::default())
        .err()
        .unwrap();
    assert!(err.is_data_integrity());

    plan.battle_state_json = Some(forged);
    let result = offline.fast_forward(&hero, &mut plan, 60.0, TWELVE_HOURS);
    assert!(matches!(result, Err(BattleError::DataIntegrityViolation(_))));
    assert_eq!(plan.executed_seconds, 300.0);

    plan.battle_state_json = Some("{not json".to_string());
    let garbage = offline.fast_forward(&hero, &mut plan, 60.0, TWELVE_HOURS);
    assert!(matches!(garbage, Err(BattleError::DataIntegrityViolation(_))));
}

#[test]
fn test_snapshot_from_another_battle_is_rejected() {
    let hero = adventurer();
    let offline = OfflineFastForwardEngine::default();
    let mut donor = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(5), epoch());
    offline.fast_forward(&hero, &mut donor, 100.0, TWELVE_HOURS).unwrap();

    let mut victim = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(5), epoch());
    victim.battle_state_json = donor.battle_state_json.clone();
    let result = offline.fast_forward(&hero, &mut victim, 100.0, TWELVE_HOURS);
    assert!(matches!(result, Err(BattleError::DataIntegrityViolation(_))));
}

#[test]
fn test_recovery_continues_past_bad_plans() {
    let hero = adventurer();
    let start = epoch();
    let good = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(10), start);
    let corrupt = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(11), start);
    let orphan = ActivityPlan::new(Uuid::new_v4(), PlanDuration::Infinite, crypt_setup(12), start);
    let good_id = good.battle_id;
    let corrupt_id = corrupt.battle_id;
    let orphan_id = orphan.battle_id;
    let mut plans = vec![good, corrupt, orphan];
    let characters = HashMap::from([(hero.id, hero.clone())]);
    let offline = OfflineFastForwardEngine::default();

    // First pass settles both valid plans and leaves snapshots behind
    let first_at = start + Duration::seconds(600);
    let first = recover_offline_plans(&offline, &mut plans, &characters, first_at, None);
    assert_eq!(first.settlements.len(), 2);
    assert_eq!(first.failures.len(), 1);
    assert_eq!(first.failures[0].battle_id, orphan_id);

    let forged = tamper_kills(plans[1].battle_state_json.as_deref().unwrap());
    plans[1].battle_state_json = Some(forged);

    let second_at = first_at + Duration::seconds(60);
    let second = recover_offline_plans(&offline, &mut plans, &characters, second_at, None);
    assert_eq!(second.settlements.len(), 1);
    assert_eq!(second.settlements[0].battle_id, good_id);
    assert_eq!(second.settlements[0].simulated_seconds, 60.0);
    assert_eq!(second.discarded_snapshots, vec![corrupt_id]);
    assert!(plans[1].battle_state_json.is_none());
    assert_eq!(plans[1].last_settled_at, first_at);
    assert_eq!(plans[0].last_settled_at, second_at);

    // The discarded plan rebuilds from its setup and settles the whole gap
    let third_at = second_at + Duration::seconds(30);
    let third = recover_offline_plans(&offline, &mut plans, &characters, third_at, Some(3600.0));
    let rebuilt = third
        .settlements
        .iter()
        .find(|s| s.battle_id == corrupt_id)
        .expect("corrupt plan recovered");
    assert_eq!(rebuilt.simulated_seconds, 90.0);
    assert_eq!(rebuilt.rng_index_start, 0);
    assert!(rebuilt.rebuilt_from_setup);
    assert!(third.discarded_snapshots.is_empty());
}

#[test]
fn test_resealed_snapshot_with_bad_track_is_discarded() {
    let hero = adventurer();
    let start = epoch();
    let plan = ActivityPlan::new(hero.id, PlanDuration::Infinite, crypt_setup(21), start);
    let battle_id = plan.battle_id;
    let mut plans = vec![plan];
    let characters = HashMap::from([(hero.id, hero.clone())]);
    let offline = OfflineFastForwardEngine::default();

    let first_at = start + Duration::seconds(120);
    let first = recover_offline_plans(&offline, &mut plans, &characters, first_at, None);
    assert_eq!(first.settlements.len(), 1);

    let resealed = reseal_with_special_interval(plans[0].battle_state_json.as_deref().unwrap(), -1.0);
    let err = BattleEngine::restore(&resealed, CombatLoopOptions::default())
        .err()
        .unwrap();
    assert!(err.is_data_integrity());
    plans[0].battle_state_json = Some(resealed);

    let second_at = first_at + Duration::seconds(60);
    let second = recover_offline_plans(&offline, &mut plans, &characters, second_at, None);
    assert_eq!(second.discarded_snapshots, vec![battle_id]);
    assert!(second.failures.is_empty());
    assert!(plans[0].battle_state_json.is_none());

    let third = recover_offline_plans(
        &offline,
        &mut plans,
        &characters,
        second_at + Duration::seconds(30),
        None,
    );
    assert_eq!(third.settlements.len(), 1);
    assert!(third.settlements[0].rebuilt_from_setup);
    assert!(plans[0].battle_state_json.is_some());
}
