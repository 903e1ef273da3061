//! Structured error types for the piqtree workspace.

use thiserror::Error;

/// Unified error type for all piqtree operations.
#[derive(Debug, Error)]
pub enum PiqtreeError {
    /// A substitution model name that matches no known model.
    #[error("Unknown substitution model: '{0}'")]
    UnknownModel(String),

    /// A rate heterogeneity string that is not `G`/`R` with an optional count.
    #[error("Unexpected value for rate_model '{0}'")]
    InvalidRateModel(String),

    /// A state frequency string that matches no known frequency type.
    #[error("Unknown state frequency type: '{0}'")]
    UnknownFrequencyType(String),

    #[error("Model '{0}' contains multiple base frequency specifications.")]
    MultipleFrequencySpec(String),

    #[error("Model '{0}' contains multiple specifications for invariant sites.")]
    MultipleInvariantSpec(String),

    #[error("Model '{0}' contains multiple rate heterogeneity specifications.")]
    MultipleRateSpec(String),

    #[error("Model '{0}' contains unexpected component.")]
    UnexpectedModelComponent(String),

    /// The native engine returned output lacking an expected element.
    #[error("IQ-TREE output malformated, {0}")]
    MalformedNativeOutput(String),

    /// The native engine signalled a runtime error; the text is kept verbatim.
    #[error("{0}")]
    NativeEngineFailure(String),

    /// I/O error (scratch directory, stream redirection, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed Newick, YAML or numeric fields)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PiqtreeError {
    /// True for errors raised while resolving or parsing a model string.
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownModel(_)
                | Self::InvalidRateModel(_)
                | Self::UnknownFrequencyType(_)
                | Self::MultipleFrequencySpec(_)
                | Self::MultipleInvariantSpec(_)
                | Self::MultipleRateSpec(_)
                | Self::UnexpectedModelComponent(_)
        )
    }
}

/// Convenience alias used throughout the piqtree workspace.
pub type Result<T> = std::result::Result<T, PiqtreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_names_input() {
        let err = PiqtreeError::UnknownModel("GYR".into());
        assert_eq!(err.to_string(), "Unknown substitution model: 'GYR'");
        assert!(err.is_model_error());
    }

    #[test]
    fn malformed_output_states_missing_element() {
        let err = PiqtreeError::MalformedNativeOutput("likelihood not found.".into());
        assert_eq!(
            err.to_string(),
            "IQ-TREE output malformated, likelihood not found."
        );
        assert!(!err.is_model_error());
    }

    #[test]
    fn native_failure_is_verbatim() {
        let text = "There must be at least 1000 bootstrap replicates";
        let err = PiqtreeError::NativeEngineFailure(text.into());
        assert_eq!(err.to_string(), text);
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PiqtreeError = io.into();
        assert!(matches!(err, PiqtreeError::Io(_)));
    }
}
