// Track timing
pub const PAUSED_SENTINEL: f64 = 1.0e18;
pub const SENTINEL_THRESHOLD: f64 = 1.0e17;

// Combat loop defaults
pub const DEFAULT_SEGMENT_SECONDS: f64 = 5.0;
pub const DEFAULT_MAX_EVENTS_PER_ADVANCE: u64 = 100_000;
pub const DEFAULT_REVIVE_DURATION_SECONDS: f64 = 10.0;
pub const DEFAULT_OFFLINE_CAP_SECONDS: f64 = 12.0 * 60.0 * 60.0;
pub const DEFAULT_ENEMY_RESPAWN_SECONDS: f64 = 2.5;

// Player derived stats
pub const BASE_PLAYER_HP: f64 = 100.0;
pub const HP_PER_STAMINA: f64 = 10.0;
pub const ARMOR_REDUCTION_DIVISOR: f64 = 100.0;
pub const MAX_DAMAGE_REDUCTION: f64 = 0.75;
pub const MIN_HASTE_FACTOR: f64 = 0.1;

// Profession base intervals (seconds)
pub const WARRIOR_ATTACK_INTERVAL: f64 = 2.0;
pub const WARRIOR_SPECIAL_INTERVAL: f64 = 12.0;
pub const RANGER_ATTACK_INTERVAL: f64 = 1.6;
pub const RANGER_SPECIAL_INTERVAL: f64 = 8.0;
pub const MAGE_ATTACK_INTERVAL: f64 = 2.4;
pub const MAGE_SPECIAL_INTERVAL: f64 = 6.0;

// RNG stream ids for split sub-streams
pub const LOOT_STREAM_ID: u64 = 1;
pub const SIMULATOR_STREAM_ID: u64 = 2;

// Snapshot envelope
pub const SNAPSHOT_VERSION: u32 = 1;

// Tags recorded on segments
pub const TAG_WAVE_CLEARED: &str = "wave_cleared";
pub const TAG_RUN_COMPLETED: &str = "run_completed";
pub const TAG_DUNGEON_RESET: &str = "dungeon_reset";
pub const TAG_PLAYER_DEATH: &str = "player_death";
pub const TAG_PLAYER_REVIVE: &str = "player_revive";
pub const TAG_PLAYER_DEFEATED: &str = "player_defeated";
pub const TAG_ENCOUNTERS_EXHAUSTED: &str = "encounters_exhausted";
pub const TAG_SPECIAL_NO_TARGET: &str = "special_no_target";
pub const TAG_CRIT: &str = "crit";
