use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Invalid trial count: {0} (must be positive)")]
    InvalidTrialCount(i64),

    #[error("Unrecognised keyword: {0:?}")]
    KeywordParseAmbiguity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dice source error: {0}")]
    Dice(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Fatal errors abort a run; everything else is logged and skipped
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SimError::KeywordParseAmbiguity(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
