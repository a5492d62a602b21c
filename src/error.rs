use thiserror::Error;

#[derive(Error, Debug)]
pub enum CistronError {
    #[error("Genome inviable: {0}")]
    GenomeInviable(String),

    #[error("Insufficient bits remaining to read {element}: requested {requested}, remaining {remaining}")]
    InsufficientBits {
        element: &'static str,
        requested: u64,
        remaining: u64,
    },

    #[error("Invalid bit count {bit_count} for {element}: expected 1..={max}")]
    InvalidBitCount {
        element: &'static str,
        bit_count: u32,
        max: u32,
    },

    #[error("Max attempts of drawing a viable genome exceeded ({attempts})")]
    PopulationDrawExhausted { attempts: usize },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CistronError {
    pub fn inviable(reason: impl Into<String>) -> Self {
        CistronError::GenomeInviable(reason.into())
    }

    /// Inviability is the only error the evolution loop retries on.
    pub fn is_inviable(&self) -> bool {
        matches!(self, CistronError::GenomeInviable(_))
    }
}

pub type Result<T> = std::result::Result<T, CistronError>;
