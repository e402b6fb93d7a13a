//! Event-driven battle simulation.

pub mod engine;
pub mod event;
pub mod handlers;
pub mod notify;
pub mod segment;
pub mod snapshot;
pub mod state;

pub use engine::{AdvanceReport, BattleEngine, BattleSetup};
pub use event::BattleEvent;
pub use notify::{BattleNotifier, Notification, NotificationLog, TracingNotifier};
pub use segment::{CombatSegment, SegmentCollector};
pub use state::{BattleState, BattleTotals};
