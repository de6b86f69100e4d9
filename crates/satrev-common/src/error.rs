use thiserror::Error;

#[derive(Debug, Error)]
pub enum SatrevError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No qualifying records: {0}")]
    EmptyResult(String),

    #[error("No input corpus available: {0}")]
    NoInput(String),
}

pub type Result<T> = std::result::Result<T, SatrevError>;
