//! Browser session capability
//!
//! The engine only talks to a page through [`BrowserSession`] and
//! [`PageElement`]. Two implementations exist: [`webdriver`] drives a real
//! browser through a WebDriver server, and `fake` (behind the `fake` feature)
//! evaluates locators against an in-memory page model.

#[cfg(any(test, feature = "fake"))]
pub mod fake;
mod locator;
mod provision;
pub mod webdriver;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

pub use locator::{css_string, xpath_literal, Locator, Selector};
pub use provision::{capabilities, WebDriverFactory};

/// Browsers a test case can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
    Edge,
}

impl BrowserKind {
    pub const ALL: [BrowserKind; 3] = [BrowserKind::Chrome, BrowserKind::Firefox, BrowserKind::Edge];

    /// Name used in the WebDriver `browserName` capability
    pub fn webdriver_name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "MicrosoftEdge",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chrome => write!(f, "chrome"),
            Self::Firefox => write!(f, "firefox"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "edge" => Ok(Self::Edge),
            other => Err(Error::Config(format!(
                "Unknown browser '{}'. Supported browsers: chrome, firefox, edge",
                other
            ))),
        }
    }
}

impl TryFrom<String> for BrowserKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Capability set used when starting a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionProfile {
    /// Full option set (window size, sandbox flags, headless)
    Standard,
    /// Bare `browserName` only, the last resort after a failed standard start
    Minimal,
}

impl fmt::Display for SessionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

/// A control on the current page
#[async_trait]
pub trait PageElement: Send + Sync {
    async fn clear(&self) -> Result<()>;

    /// Type text into the element, appending to any existing value
    async fn send_keys(&self, text: &str) -> Result<()>;

    async fn click(&self) -> Result<()>;

    /// Rendered text content
    async fn text(&self) -> Result<String>;

    async fn attr(&self, name: &str) -> Result<Option<String>>;

    async fn is_displayed(&self) -> Result<bool>;
}

/// A live browser session
///
/// The runner owns the session; the engine borrows it for one test case.
#[async_trait]
pub trait BrowserSession: Send + Sync + Sized {
    type Element: PageElement;

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// Full page source of the current document
    async fn page_source(&self) -> Result<String>;

    /// All elements matching `locator`, in document order
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>>;

    /// End the session and release the browser
    async fn quit(self) -> Result<()>;
}

/// Starts browser sessions for the runner
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: BrowserSession;

    async fn provision(&self, browser: BrowserKind, profile: SessionProfile) -> Result<Self::Session>;
}
