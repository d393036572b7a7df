//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! Coordination itself never fails: unknown or duplicate asset reports are
//! absorbed, and a stalled load simply keeps readiness false. The fallible
//! surfaces are configuration and construction, covered by [`VitrineError`]:
//! - Invalid tuning values (negative durations, thresholds out of range)
//! - Degenerate scroll ranges
//! - Empty entrance timelines
//! - Configuration parsing errors
//!
//! # Usage
//!
//! Fallible constructors return [`Result<T>`], an alias for
//! `std::result::Result<T, VitrineError>`.
//!
//! ```rust,ignore
//! use vitrine::config::StageConfig;
//!
//! let config = StageConfig::from_json_str(r#"{ "preloader": { "settle_delay": 0.4 } }"#)?;
//! ```

use thiserror::Error;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum VitrineError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A tuning value is outside its accepted range.
    #[error("Invalid configuration value for `{field}`: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field
        field: &'static str,
        /// Human readable constraint that was violated
        reason: String,
    },

    /// Configuration JSON could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // Scroll Errors
    // ========================================================================
    /// Visibility threshold must lie in `(0, 1]`.
    #[error("Visibility threshold {0} is outside (0, 1]")]
    InvalidVisibilityThreshold(f32),

    /// A region with non-positive height cannot be tracked.
    #[error("Region height must be positive, got {0}")]
    InvalidRegion(f32),

    // ========================================================================
    // Timeline Errors
    // ========================================================================
    /// An entrance timeline needs at least one entry.
    #[error("Entrance timeline has no entries")]
    EmptyTimeline,

    /// A timeline entry carries a negative duration or offset.
    #[error("Timeline entry {index} has invalid timing: {reason}")]
    InvalidTiming {
        /// Position of the entry in the timeline
        index: usize,
        /// What was wrong with it
        reason: String,
    },
}

/// Alias for `Result<T, VitrineError>`.
pub type Result<T> = std::result::Result<T, VitrineError>;
