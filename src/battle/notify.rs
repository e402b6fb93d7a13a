//! Outbound notifications for live observers (UI push, logs).

use crate::encounter::types::EncounterId;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    AttackStarted {
        at: f64,
        target: EncounterId,
    },
    DamageDealt {
        at: f64,
        target: EncounterId,
        amount: f64,
        source: String,
        crit: bool,
    },
    DamageReceived {
        at: f64,
        source: String,
        amount: f64,
    },
    EnemyKilled {
        at: f64,
        enemy: EncounterId,
        definition_id: String,
    },
    PlayerDied {
        at: f64,
    },
    PlayerRevived {
        at: f64,
    },
    WaveSpawned {
        at: f64,
        wave_index: usize,
        enemies: usize,
    },
    RunCompleted {
        at: f64,
        runs_completed: u64,
    },
}

pub trait BattleNotifier: Send {
    fn notify(&mut self, notification: &Notification);
}

/// Forwards every notification to `tracing` at trace level.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl BattleNotifier for TracingNotifier {
    fn notify(&mut self, notification: &Notification) {
        trace!(?notification, "battle notification");
    }
}

/// Collects notifications into a buffer shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything collected so far.
    pub fn take(&self) -> Vec<Notification> {
        match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl BattleNotifier for NotificationLog {
    fn notify(&mut self, notification: &Notification) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_shares_buffer_between_clones() {
        let log = NotificationLog::new();
        let mut sink = log.clone();
        sink.notify(&Notification::PlayerDied { at: 1.0 });
        sink.notify(&Notification::PlayerRevived { at: 11.0 });

        let taken = log.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0], Notification::PlayerDied { at: 1.0 });
        assert!(log.take().is_empty());
    }
}
