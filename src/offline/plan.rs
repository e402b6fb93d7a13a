//! Persisted activity plan: how long a character fights and how far along it is.

use crate::battle::engine::BattleSetup;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlanDuration {
    Finite { seconds: f64 },
    Infinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Running,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPlan {
    pub battle_id: Uuid,
    pub character_id: Uuid,
    pub duration: PlanDuration,
    pub executed_seconds: f64,
    /// Opaque snapshot from [`crate::battle::BattleEngine::snapshot`]
    pub battle_state_json: Option<String>,
    pub status: PlanStatus,
    pub setup: BattleSetup,
    pub last_settled_at: DateTime<Utc>,
}

impl ActivityPlan {
    pub fn new(
        character_id: Uuid,
        duration: PlanDuration,
        setup: BattleSetup,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            battle_id: Uuid::new_v4(),
            character_id,
            duration,
            executed_seconds: 0.0,
            battle_state_json: None,
            status: PlanStatus::Running,
            setup,
            last_settled_at: started_at,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == PlanStatus::Running
    }

    /// Seconds left before the plan completes; `None` for infinite plans.
    pub fn remaining_seconds(&self) -> Option<f64> {
        match self.duration {
            PlanDuration::Finite { seconds } => Some((seconds - self.executed_seconds).max(0.0)),
            PlanDuration::Infinite => None,
        }
    }

    /// simulated = min(remaining (finite only), offline, cap)
    pub fn simulatable_seconds(&self, offline_seconds: f64, max_cap_seconds: f64) -> f64 {
        let mut seconds = offline_seconds.min(max_cap_seconds);
        if let Some(remaining) = self.remaining_seconds() {
            seconds = seconds.min(remaining);
        }
        seconds.max(0.0)
    }

    pub fn duration_reached(&self) -> bool {
        match self.duration {
            PlanDuration::Finite { seconds } => self.executed_seconds >= seconds,
            PlanDuration::Infinite => false,
        }
    }
}
