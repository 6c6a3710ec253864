/*!
 * Error types for the coze2draft application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while acquiring a remote media resource
#[derive(Error, Debug)]
pub enum FetchError {
    /// The source reference is not a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Error when making the HTTP request fails (timeout, DNS, connection)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The server answered with a non-success status code
    #[error("Server responded with status {status_code} for {url}")]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Requested URL
        url: String,
    },

    /// The response body streamed to disk ended up empty
    #[error("Downloaded file is empty: {0}")]
    EmptyBody(PathBuf),

    /// Error writing the streamed body to local storage
    #[error("Failed to write download to {path}: {message}")]
    WriteFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },
}

/// Errors that can occur during draft document assembly
#[derive(Error, Debug)]
pub enum DraftError {
    /// The serialized document could not be written
    #[error("Failed to save draft document: {0}")]
    SaveFailed(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from media acquisition
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from draft assembly
    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
