//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Parse reporting for document-level runs

pub mod error;
pub mod report;

// Re-export commonly used items
pub use error::{ParseError, ParseResult};
pub use report::{BlockError, ParseReport};
