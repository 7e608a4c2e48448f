//! Error Handling Module
//!
//! This module provides error handling for the Suno client, including:
//! - Core error type (`SunoError`) and its presentation category (`ErrorKind`)
//! - Classification of remote failures into typed errors
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use suno::error::{classify_code, ErrorKind};
//!
//! let error = classify_code(401, "invalid key");
//! assert_eq!(error.kind(), ErrorKind::Auth);
//! assert!(!error.is_retryable());
//! ```

mod classify;
mod conversions;
pub mod types;

pub use classify::*;
pub use types::*;
