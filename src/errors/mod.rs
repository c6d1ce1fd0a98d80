//! Centralized error handling for the channel reconciler
//!
//! # Error Categories
//!
//! - **Configuration**: missing or invalid settings
//! - **MalformedUpstream**: provider response drifted from the scraped shape
//! - **Protocol**: aggregator websocket or decode failures
//! - **PlaylistNotFound / TaskNotFound**: required remote resources absent
//! - **ActionFailures**: provider toggles that failed within a batch
//!
//! # Usage
//!
//! ```rust
//! use channel_reconciler::errors::{AppError, AppResult};
//!
//! fn example_function(url: &str) -> AppResult<String> {
//!     if url.is_empty() {
//!         return Err(AppError::configuration("provider.url is required"));
//!     }
//!     Ok(url.to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
