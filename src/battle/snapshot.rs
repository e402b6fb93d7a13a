//! Checksummed snapshot envelope.
//!
//! JSON layout: `{version, battle_id, checksum, state}`. The checksum is the
//! hex SHA-256 of the bincode encoding of `state`, so any edit to the state
//! that changes its meaning is caught on load.

use super::state::BattleState;
use crate::core::constants::SNAPSHOT_VERSION;
use crate::core::error::{BattleError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    battle_id: Uuid,
    checksum: String,
    state: &'a BattleState,
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    battle_id: Uuid,
    checksum: String,
    state: BattleState,
}

fn state_checksum(state: &BattleState) -> Result<String> {
    let data = bincode::serialize(state)?;
    let digest = Sha256::digest(&data);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

pub fn encode(state: &BattleState) -> Result<String> {
    let envelope = SnapshotOut {
        version: SNAPSHOT_VERSION,
        battle_id: state.battle_id,
        checksum: state_checksum(state)?,
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode and verify a snapshot. Every failure is a
/// [`BattleError::DataIntegrityViolation`].
pub fn decode(json: &str) -> Result<BattleState> {
    let envelope: SnapshotIn = serde_json::from_str(json).map_err(|e| {
        BattleError::DataIntegrityViolation(format!("unreadable snapshot: {}", e))
    })?;

    if envelope.version != SNAPSHOT_VERSION {
        return Err(BattleError::DataIntegrityViolation(format!(
            "unsupported snapshot version {} (expected {})",
            envelope.version, SNAPSHOT_VERSION
        )));
    }
    if envelope.battle_id != envelope.state.battle_id {
        return Err(BattleError::DataIntegrityViolation(format!(
            "envelope battle {} does not match state battle {}",
            envelope.battle_id, envelope.state.battle_id
        )));
    }

    let computed = state_checksum(&envelope.state).map_err(|e| {
        BattleError::DataIntegrityViolation(format!("cannot re-encode state: {}", e))
    })?;
    if computed != envelope.checksum {
        return Err(BattleError::DataIntegrityViolation(format!(
            "checksum mismatch for battle {}",
            envelope.battle_id
        )));
    }

    envelope
        .state
        .validate()
        .map_err(BattleError::DataIntegrityViolation)?;
    Ok(envelope.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::engine::{BattleEngine, BattleSetup};
    use crate::character::profession::ProfessionId;
    use crate::character::profile::{CharacterProfile, CharacterStats};
    use crate::core::config::CombatLoopOptions;
    use crate::encounter::presets;
    use crate::encounter::provider::EncounterSource;

    fn snapshot_json() -> String {
        let hero = CharacterProfile::new("Saver", ProfessionId::Warrior, CharacterStats::default());
        let setup = BattleSetup {
            seed: 21,
            encounters: EncounterSource::dungeon(presets::sunken_crypt()),
        };
        let mut engine =
            BattleEngine::new(Uuid::new_v4(), &setup, &hero, CombatLoopOptions::default())
                .unwrap();
        engine.advance_until(42.0).unwrap();
        engine.snapshot().unwrap()
    }

    fn edit(json: &str, f: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
        f(&mut value);
        value.to_string()
    }

    #[test]
    fn test_decode_then_encode_is_stable() {
        let json = snapshot_json();
        let state = decode(&json).unwrap();
        assert_eq!(encode(&state).unwrap(), json);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let json = edit(&snapshot_json(), |v| v["version"] = serde_json::json!(99));
        assert!(decode(&json).unwrap_err().is_data_integrity());
    }

    #[test]
    fn test_envelope_id_mismatch_rejected() {
        let other = Uuid::new_v4().to_string();
        let json = edit(&snapshot_json(), |v| v["battle_id"] = serde_json::json!(other));
        assert!(decode(&json).unwrap_err().is_data_integrity());
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let json = edit(&snapshot_json(), |v| {
            v["checksum"] = serde_json::json!("00".repeat(32));
        });
        let err = decode(&json).unwrap_err();
        assert!(matches!(err, BattleError::DataIntegrityViolation(ref m) if m.contains("checksum")));
    }

    #[test]
    fn test_truncated_json_rejected() {
        let json = snapshot_json();
        let truncated = &json[..json.len() / 2];
        assert!(decode(truncated).unwrap_err().is_data_integrity());
    }
}
