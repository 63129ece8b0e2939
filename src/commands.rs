//! CLI command definitions
//!
//! Defines the clap commands for the login harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::browser::BrowserKind;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a login test suite
    Run {
        /// Path to the YAML or JSON suite file
        suite: PathBuf,

        /// Run every case in this browser instead of the one it names
        #[arg(long, short)]
        browser: Option<BrowserKind>,

        /// Login URL for cases that do not name one
        #[arg(long)]
        url: Option<String>,

        /// Run browsers without a visible window
        #[arg(long)]
        headless: bool,

        /// Write the JSON run report to this path
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the inputs of a login page and the controls the cascade would pick
    Inspect {
        /// Page to inspect
        url: String,

        /// Browser to use (default from config, else chrome)
        #[arg(long, short)]
        browser: Option<BrowserKind>,

        /// Run the browser without a visible window
        #[arg(long)]
        headless: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write an example suite file
    Template {
        /// Destination (prints to stdout when omitted)
        path: Option<PathBuf>,
    },
}
