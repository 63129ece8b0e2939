//! Login harness - browser-driven login tests
//!
//! Finds the username, password and submit controls on arbitrary login pages
//! with an ordered locator cascade, submits credentials, classifies the page
//! the browser lands on, and resets the session for the next case.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod common;
pub mod engine;
pub mod inspect;
pub mod report;
pub mod runner;
pub mod suite;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use engine::{FormEngine, TestOutcome, Timings, Verdict};
pub use runner::Runner;
pub use suite::{TestCase, TestSuite};
