//! Common utilities and types for NNRT
//!
//! This crate provides shared functionality used across the runtime,
//! including the error taxonomy and small formatting helpers.

pub mod error;
pub mod utils;

// Re-export commonly used types
pub use error::{Error, Result};
