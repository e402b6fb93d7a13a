use thiserror::Error;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Cannot schedule event at {at} before current time {now}")]
    ScheduleInPast { at: f64, now: f64 },

    #[error("Data integrity violation: {0}")]
    DataIntegrityViolation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl BattleError {
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, BattleError::DataIntegrityViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;
