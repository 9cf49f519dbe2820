//! Error handling for question parsing
//!
//! This module provides a unified error type and result type for all
//! parsing operations.

use std::fmt;

/// Parsing error type
#[derive(Debug, Clone)]
pub enum ParseError {
    /// Structural error - the block violates the expected question shape.
    /// Carries the raw block so nothing is lost on failure.
    StructuralError { message: String, raw_block: String },
    /// Invalid input
    InvalidInput { message: String },
    /// IO error (for file operations)
    IoError { message: String },
}

impl ParseError {
    pub fn structural(message: impl Into<String>, raw_block: impl Into<String>) -> Self {
        ParseError::StructuralError {
            message: message.into(),
            raw_block: raw_block.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ParseError::InvalidInput {
            message: message.into(),
        }
    }

    /// Raw block text preserved with the error, when the variant carries one.
    pub fn raw_block(&self) -> Option<&str> {
        match self {
            ParseError::StructuralError { raw_block, .. } => Some(raw_block.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::StructuralError { message, .. } => {
                write!(f, "Structural error: {}", message)
            }
            ParseError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            ParseError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ParseError::structural("unbalanced braces", "\\begin{ex}{");
        assert_eq!(err.to_string(), "Structural error: unbalanced braces");
        assert_eq!(err.raw_block(), Some("\\begin{ex}{"));

        let err = ParseError::invalid("empty document");
        assert_eq!(err.to_string(), "Invalid input: empty document");
        assert_eq!(err.raw_block(), None);
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.tex");
        let err: ParseError = io.into();
        assert!(err.to_string().contains("missing.tex"));
    }
}
