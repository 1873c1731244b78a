/// Error types for parameter derivation, deck generation and model runs
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the RHEM pipeline
#[derive(Error, Debug)]
pub enum RhemError {
    /// Unit code outside 1 (metric) / 2 (English)
    #[error("Unit should be 1-metric or 2-English. Digit {0} is not valid.")]
    InvalidUnit(i32),

    /// Soil texture class not present in the lookup table
    #[error("No soil texture row for class '{0}'")]
    UnknownSoilTexture(String),

    /// A parameter was never derived (e.g. SL/SX for an unknown slope shape)
    #[error("Parameter {0} is not set")]
    MissingParameter(&'static str),

    /// Risk assessment called with too many alternative scenarios
    #[error("The risk assessment can be performed with a maximum of {max} scenarios (found: {found})")]
    TooManyScenarios { max: usize, found: usize },

    /// File create/read/rename failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// External executable exited with a nonzero status
    #[error("Problem in running {program}: exit status {status}")]
    ExternalRun { program: PathBuf, status: i32 },

    /// Malformed archive, deck or model output
    #[error("Failed to parse: {0}")]
    Parse(String),

    /// Malformed TOML configuration or lookup table
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl RhemError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        RhemError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Type alias for Results using RhemError
pub type Result<T> = std::result::Result<T, RhemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_context_in_message() {
        let err = RhemError::io(
            "Problem in generating the run file",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        );
        assert_eq!(
            err.to_string(),
            "Problem in generating the run file: no such directory"
        );
    }

    #[test]
    fn invalid_unit_message() {
        assert!(RhemError::InvalidUnit(3).to_string().contains("Digit 3"));
    }
}
