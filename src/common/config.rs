//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};
use crate::browser::BrowserKind;
use crate::engine::Timings;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Default settings applied to test cases
    #[serde(default)]
    pub defaults: Defaults,

    /// Settle delays and wait budgets
    #[serde(default)]
    pub timings: TimingsConfig,

    /// WebDriver endpoints
    #[serde(default)]
    pub webdriver: WebDriverConfig,
}

/// Default settings
#[derive(Debug, Deserialize, Default)]
pub struct Defaults {
    /// URL used by test cases that do not name one
    #[serde(default)]
    pub target_url: Option<String>,

    /// Browser used by test cases that do not name one
    #[serde(default)]
    pub browser: BrowserKind,

    /// Run browsers without a visible window
    #[serde(default)]
    pub headless: bool,
}

/// Timing settings
#[derive(Debug, Deserialize)]
pub struct TimingsConfig {
    /// Pause after navigating to the login page
    #[serde(default = "default_navigation_settle")]
    pub navigation_settle_ms: u64,

    /// Pause after clicking the submit control
    #[serde(default = "default_submit_settle")]
    pub submit_settle_ms: u64,

    /// Pause after a logout click or navigation
    #[serde(default = "default_logout_settle")]
    pub logout_settle_ms: u64,

    /// Upper bound for explicit waits such as "form is present"
    #[serde(default = "default_explicit_wait")]
    pub explicit_wait_secs: u64,

    /// Interval between polls during an explicit wait
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            navigation_settle_ms: default_navigation_settle(),
            submit_settle_ms: default_submit_settle(),
            logout_settle_ms: default_logout_settle(),
            explicit_wait_secs: default_explicit_wait(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_navigation_settle() -> u64 {
    2_000
}
fn default_submit_settle() -> u64 {
    3_000
}
fn default_logout_settle() -> u64 {
    1_000
}
fn default_explicit_wait() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    250
}

impl TimingsConfig {
    /// Convert to the durations the engine works with
    pub fn to_timings(&self) -> Timings {
        Timings {
            navigation_settle: Duration::from_millis(self.navigation_settle_ms),
            submit_settle: Duration::from_millis(self.submit_settle_ms),
            logout_settle: Duration::from_millis(self.logout_settle_ms),
            explicit_wait: Duration::from_secs(self.explicit_wait_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// WebDriver endpoint configuration
#[derive(Debug, Deserialize)]
pub struct WebDriverConfig {
    /// Endpoint used for every browser without an override
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// chromedriver endpoint
    #[serde(default)]
    pub chrome: Option<String>,

    /// geckodriver endpoint
    #[serde(default)]
    pub firefox: Option<String>,

    /// msedgedriver endpoint
    #[serde(default)]
    pub edge: Option<String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            chrome: None,
            firefox: None,
            edge: None,
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

impl WebDriverConfig {
    /// Endpoint to connect to for `browser`
    pub fn endpoint(&self, browser: BrowserKind) -> &str {
        let specific = match browser {
            BrowserKind::Chrome => self.chrome.as_deref(),
            BrowserKind::Firefox => self.firefox.as_deref(),
            BrowserKind::Edge => self.edge.as_deref(),
        };
        specific.unwrap_or(&self.url)
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.defaults.browser, BrowserKind::Chrome);
        assert!(config.defaults.target_url.is_none());
        assert!(!config.defaults.headless);

        let timings = config.timings.to_timings();
        assert_eq!(timings.navigation_settle, Duration::from_secs(2));
        assert_eq!(timings.submit_settle, Duration::from_secs(3));
        assert_eq!(timings.explicit_wait, Duration::from_secs(10));
        assert_eq!(config.webdriver.endpoint(BrowserKind::Edge), "http://localhost:4444");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
[defaults]
target_url = "https://example.test/login"
browser = "Firefox"
headless = true

[timings]
submit_settle_ms = 500

[webdriver]
chrome = "http://localhost:9515"
"#,
        )
        .unwrap();

        assert_eq!(
            config.defaults.target_url.as_deref(),
            Some("https://example.test/login")
        );
        assert_eq!(config.defaults.browser, BrowserKind::Firefox);
        assert!(config.defaults.headless);
        assert_eq!(config.timings.submit_settle_ms, 500);
        assert_eq!(config.timings.logout_settle_ms, 1_000);
        assert_eq!(
            config.webdriver.endpoint(BrowserKind::Chrome),
            "http://localhost:9515"
        );
        assert_eq!(
            config.webdriver.endpoint(BrowserKind::Firefox),
            "http://localhost:4444"
        );
    }

    #[test]
    fn test_unknown_browser_is_rejected() {
        let err = Config::parse("[defaults]\nbrowser = \"netscape\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timings]\nexplicit_wait_secs = 3").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.timings.explicit_wait_secs, 3);
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/login-harness.toml")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
