use thiserror::Error;

/// Startup configuration failures. These are the only errors that should
/// stop the process before the first monitoring cycle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("invalid brands configuration: {0}")]
    Validation(String),
}
