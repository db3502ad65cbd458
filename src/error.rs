use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed listing #{index}: {reason}")]
    MalformedListing { index: usize, reason: String },

    #[error("Unparsable value for {field}: {raw:?}")]
    UnparsableValue { field: String, raw: String },

    #[error("Missing section: {0}")]
    MissingSection(String),

    #[error("Valuation undefined: {0}")]
    DivisionUndefined(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        PipelineError::MalformedListing {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
