//! Offline progression: settle the time a player was away by running the
//! same battle loop synchronously.

pub mod fast_forward;
pub mod plan;
pub mod recovery;

pub use fast_forward::{OfflineFastForwardEngine, OfflineSettlement};
pub use plan::{ActivityPlan, PlanDuration, PlanStatus};
pub use recovery::{recover_offline_plans, RecoveryFailure, RecoveryReport};
