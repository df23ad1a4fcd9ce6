use thiserror::Error;

/// Unified error type for the differencing crate.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The named dimension is not one of the field's dimensions.
    #[error("dimension `{0}` not found in field")]
    DimensionNotFound(String),
    /// Coordinate not strictly increasing, too short, or wider than its period.
    #[error("invalid grid along `{dim}`: {reason}")]
    InvalidGrid { dim: String, reason: String },
    /// Spacing or metric factor numerically zero or non-finite.
    #[error("degenerate grid along `{dim}`: {reason}")]
    DegenerateGrid { dim: String, reason: String },
    /// No dimension name could be resolved from the call or the defaults.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Unknown option name or a value rejected by its validator.
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// Field construction with mismatched dimensions, shapes or coordinates.
    #[error("shape error: {0}")]
    Shape(String),
    /// Wrapper around I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failures.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// YAML parsing error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DiffError {
    pub fn invalid_grid<D: Into<String>, R: Into<String>>(dim: D, reason: R) -> Self {
        Self::InvalidGrid {
            dim: dim.into(),
            reason: reason.into(),
        }
    }

    pub fn degenerate_grid<D: Into<String>, R: Into<String>>(dim: D, reason: R) -> Self {
        Self::DegenerateGrid {
            dim: dim.into(),
            reason: reason.into(),
        }
    }

    pub fn shape<T: Into<String>>(msg: T) -> Self {
        Self::Shape(msg.into())
    }
}

pub type Result<T, E = DiffError> = std::result::Result<T, E>;
