//! Generator error types.

use std::path::PathBuf;
use thiserror::Error;

/// Every way a generator run can fail.
///
/// All variants are fatal to the run: the generator never skips a function
/// and continues, because a partial catalog would leave the C and SQL
/// artifacts out of step with each other.
#[derive(Debug, Error)]
pub enum GenError {
    /// The schema document is not valid TOML
    #[error("Failed to parse function catalog: {0}")]
    Parse(#[from] toml::de::Error),

    /// The schema document is not well-formed TA-Lib XML
    #[error("Failed to parse XML function catalog: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// A function descriptor is missing a section or has a malformed field
    #[error("Function '{function}': invalid '{field}': {reason}")]
    Structural {
        function: String,
        field: String,
        reason: String,
    },

    /// An argument carries a type tag the classifier does not know for its role
    #[error("Function '{function}': argument '{argument}' has unknown {role} type '{tag}'")]
    UnknownType {
        function: String,
        argument: String,
        tag: String,
        role: String,
    },

    /// Two schema entries would produce the same generated identifier
    #[error("Identifier '{identifier}' is produced by both {first} and {second}")]
    NamingCollision {
        identifier: String,
        first: String,
        second: String,
    },

    /// Reading the schema or writing an artifact failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Formatting into an in-memory buffer failed
    #[error("Code generation error: {0}")]
    Format(#[from] std::fmt::Error),
}

impl GenError {
    pub(crate) fn structural(
        function: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GenError::Structural {
            function: function.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_message_names_function_and_field() {
        let err = GenError::structural("MACD", "outputs", "missing section");
        assert_eq!(
            err.to_string(),
            "Function 'MACD': invalid 'outputs': missing section"
        );
    }

    #[test]
    fn test_format_error_converts() {
        let err: GenError = std::fmt::Error.into();
        assert!(matches!(err, GenError::Format(_)));
    }
}
