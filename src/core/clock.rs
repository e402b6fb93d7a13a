use serde::{Deserialize, Serialize};

/// Monotonic simulation time in seconds. Only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    now: f64,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: f64) -> Self {
        assert!(now >= 0.0, "clock cannot start at negative time {}", now);
        Self { now }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn advance_to(&mut self, target: f64) {
        assert!(
            target >= self.now,
            "clock cannot move backwards: {} -> {}",
            self.now,
            target
        );
        self.now = target;
    }
}
