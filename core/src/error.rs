use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("Invalid time zone: '{zone}'")]
    InvalidTimeZone { zone: String },

    #[error("Bar segment group {group} is malformed: {reason}")]
    Layout { group: usize, reason: String },

    #[error("Card '{id}' is registered more than once")]
    DuplicateCard { id: String },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ClockResult<T> = Result<T, ClockError>;
