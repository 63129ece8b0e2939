//! Error types for the login harness
//!
//! Errors raised while executing a single test case end up verbatim in the
//! `Error: ...` verdict, so their messages are written for the report reader.

use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::browser::BrowserKind;
use crate::engine::Role;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the login harness
#[derive(Error, Debug)]
pub enum Error {
    // === Page Interaction Errors ===
    #[error("{0} not found")]
    ElementNotFound(Role),

    #[error("Navigation to '{url}' failed: {message}")]
    Navigation { url: String, message: String },

    #[error("WebDriver command failed: {0}")]
    WebDriver(String),

    #[error("No target URL configured for test case {id}")]
    NoTargetUrl { id: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    // === Session Errors ===
    #[error("Could not start a {browser} session: {message}")]
    SessionProvision { browser: BrowserKind, message: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid test suite: {0}")]
    Suite(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a navigation error for `url`
    pub fn navigation(url: &str, message: impl ToString) -> Self {
        Self::Navigation {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a session provisioning error
    pub fn session_provision(browser: BrowserKind, message: impl ToString) -> Self {
        Self::SessionProvision {
            browser,
            message: message.to_string(),
        }
    }

    /// Wrap a failed WebDriver command
    pub fn webdriver(message: impl ToString) -> Self {
        Self::WebDriver(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_messages() {
        assert_eq!(
            Error::ElementNotFound(Role::Username).to_string(),
            "Username input field not found"
        );
        assert_eq!(
            Error::ElementNotFound(Role::Password).to_string(),
            "Password input field not found"
        );
        assert_eq!(
            Error::ElementNotFound(Role::Submit).to_string(),
            "Login button not found"
        );
    }

    #[test]
    fn test_provision_error_names_browser() {
        let err = Error::session_provision(BrowserKind::Firefox, "connection refused");
        assert_eq!(
            err.to_string(),
            "Could not start a firefox session: connection refused"
        );
    }
}
