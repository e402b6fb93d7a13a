//! Stacking timed buffs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-stat modifiers. Used both as a per-stack contribution and as the
/// summed aggregate over all active buffs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatModifiers {
    /// Added to the physical damage multiplier (0.1 = +10% damage)
    pub damage_multiplier_physical: f64,
    /// Added to haste percent (10.0 = 10% faster attacks)
    pub haste_percent: f64,
    /// Added to incoming damage reduction (0.1 = 10% less damage taken)
    pub damage_reduction: f64,
    /// Added to crit chance (0.05 = +5 percentage points)
    pub crit_chance: f64,
}

impl StatModifiers {
    pub fn add_scaled(&mut self, other: &StatModifiers, factor: f64) {
        self.damage_multiplier_physical += other.damage_multiplier_physical * factor;
        self.haste_percent += other.haste_percent * factor;
        self.damage_reduction += other.damage_reduction * factor;
        self.crit_chance += other.crit_chance * factor;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffDefinition {
    pub id: String,
    pub duration: f64,
    pub max_stacks: u32,
    pub per_stack: StatModifiers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffInstance {
    pub definition: BuffDefinition,
    pub stacks: u32,
    pub expires_at: f64,
}

/// Receives sparse observability tags such as `enemy_buff_applied:enemy_enrage`.
pub trait TagRecorder {
    fn record_tag(&mut self, tag: &str);
}

/// Whose buffs these are; decides the tag prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffOwner {
    Player,
    Enemy,
}

impl BuffOwner {
    fn tag_prefix(&self) -> &'static str {
        match self {
            BuffOwner::Player => "player",
            BuffOwner::Enemy => "enemy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffManager {
    owner: BuffOwner,
    buffs: BTreeMap<String, BuffInstance>,
}

impl BuffManager {
    pub fn new(owner: BuffOwner) -> Self {
        Self {
            owner,
            buffs: BTreeMap::new(),
        }
    }

    /// Add a stack (capped at `max_stacks`) and refresh the expiry.
    /// Returns the stack count after applying.
    pub fn apply(
        &mut self,
        definition: &BuffDefinition,
        now: f64,
        recorder: Option<&mut dyn TagRecorder>,
    ) -> u32 {
        assert!(
            definition.duration > 0.0,
            "buff duration must be positive, got {}",
            definition.duration
        );
        assert!(definition.max_stacks >= 1, "buff max_stacks must be at least 1");

        let expires_at = now + definition.duration;
        let instance = self
            .buffs
            .entry(definition.id.clone())
            .or_insert_with(|| BuffInstance {
                definition: definition.clone(),
                stacks: 0,
                expires_at,
            });
        instance.definition = definition.clone();
        instance.stacks = (instance.stacks + 1).min(definition.max_stacks);
        instance.expires_at = expires_at;
        let stacks = instance.stacks;

        if let Some(recorder) = recorder {
            recorder.record_tag(&format!(
                "{}_buff_applied:{}",
                self.owner.tag_prefix(),
                definition.id
            ));
        }
        stacks
    }

    /// Remove every buff whose expiry is at or before `now`.
    pub fn tick(&mut self, now: f64) -> Vec<String> {
        let expired: Vec<String> = self
            .buffs
            .iter()
            .filter(|(_, b)| b.expires_at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.buffs.remove(id);
        }
        expired
    }

    pub fn aggregate(&self) -> StatModifiers {
        let mut total = StatModifiers::default();
        for buff in self.buffs.values() {
            total.add_scaled(&buff.definition.per_stack, buff.stacks as f64);
        }
        total
    }

    pub fn stacks(&self, id: &str) -> u32 {
        self.buffs.get(id).map_or(0, |b| b.stacks)
    }

    pub fn get(&self, id: &str) -> Option<&BuffInstance> {
        self.buffs.get(id)
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffs.clear();
    }

    /// Check invariants on buffs loaded from outside.
    pub fn validate(&self) -> Result<(), String> {
        for (id, buff) in &self.buffs {
            let definition = &buff.definition;
            if *id != definition.id {
                return Err(format!("buff keyed {} holds {}", id, definition.id));
            }
            if !(definition.duration > 0.0) {
                return Err(format!("buff {} duration must be positive", id));
            }
            if definition.max_stacks == 0 {
                return Err(format!("buff {} max_stacks must be at least 1", id));
            }
            if buff.stacks == 0 || buff.stacks > definition.max_stacks {
                return Err(format!(
                    "buff {} has {} stacks (max {})",
                    id, buff.stacks, definition.max_stacks
                ));
            }
            if !buff.expires_at.is_finite() {
                return Err(format!("buff {} expiry {} is invalid", id, buff.expires_at));
            }
        }
        Ok(())
    }
}
