//! Error type definitions for the channel reconciler
//!
//! Every failure a run can hit maps onto one variant here. All variants except
//! `ActionFailures` abort the pipeline where they are raised; `ActionFailures`
//! is collected across a whole batch of provider toggles before it surfaces.

use thiserror::Error;

use crate::models::Action;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid settings, detected before any remote call
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The provider response no longer has the shape we scrape
    #[error("Malformed upstream response: {message}")]
    MalformedUpstream { message: String },

    /// Aggregator connection failure or undecodable aggregator response
    #[error("Aggregator protocol error: {message}")]
    Protocol { message: String },

    /// The configured playlist is not known to the aggregator
    #[error("Playlist not found on aggregator: {name}")]
    PlaylistNotFound { name: String },

    /// The media server does not expose the configured scheduled task
    #[error("Scheduled task not found on media server: {key}")]
    TaskNotFound { key: String },

    /// One or more provider toggles failed
    #[error("{} of {attempted} channel actions failed", failures.len())]
    ActionFailures {
        failures: Vec<ActionFailure>,
        attempted: usize,
    },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// A single provider toggle that did not go through
#[derive(Debug, Clone)]
pub struct ActionFailure {
    pub action: Action,
    pub message: String,
}

impl std::fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' ({}): {}",
            self.action.target, self.action.title, self.action.channel_id, self.message
        )
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed upstream error
    pub fn malformed_upstream<S: Into<String>>(message: S) -> Self {
        Self::MalformedUpstream {
            message: message.into(),
        }
    }

    /// Create an aggregator protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn playlist_not_found<S: Into<String>>(name: S) -> Self {
        Self::PlaylistNotFound { name: name.into() }
    }

    pub fn task_not_found<S: Into<String>>(key: S) -> Self {
        Self::TaskNotFound { key: key.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error ends the run at the point it was raised
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ActionFailures { .. })
    }
}
