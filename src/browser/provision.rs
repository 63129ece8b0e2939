//! Session provisioning
//!
//! Builds W3C capabilities per browser and profile, and starts sessions
//! against the configured WebDriver endpoints.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::webdriver::WebDriverSession;
use super::{BrowserKind, SessionFactory, SessionProfile};
use crate::common::config::WebDriverConfig;
use crate::common::Result;

/// Chrome flags that keep the browser stable inside containers and CI
const CHROME_ARGS: &[&str] = &[
    "--window-size=1920,1080",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
];

/// Build the capabilities used to start `browser`
pub fn capabilities(
    browser: BrowserKind,
    headless: bool,
    profile: SessionProfile,
) -> Map<String, Value> {
    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!(browser.webdriver_name()));

    if profile == SessionProfile::Minimal {
        return caps;
    }

    match browser {
        BrowserKind::Chrome => {
            let mut args: Vec<&str> = CHROME_ARGS.to_vec();
            if headless {
                args.push("--headless");
            }
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Firefox => {
            let args: Vec<&str> = if headless { vec!["-headless"] } else { Vec::new() };
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
        BrowserKind::Edge => {
            let args: Vec<&str> = if headless { vec!["--headless"] } else { Vec::new() };
            caps.insert("ms:edgeOptions".to_string(), json!({ "args": args }));
        }
    }

    caps
}

/// Starts real browser sessions over WebDriver
pub struct WebDriverFactory {
    endpoints: WebDriverConfig,
    headless: bool,
}

impl WebDriverFactory {
    pub fn new(endpoints: WebDriverConfig, headless: bool) -> Self {
        Self {
            endpoints,
            headless,
        }
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    type Session = WebDriverSession;

    async fn provision(
        &self,
        browser: BrowserKind,
        profile: SessionProfile,
    ) -> Result<WebDriverSession> {
        let endpoint = self.endpoints.endpoint(browser);
        let caps = capabilities(browser, self.headless, profile);
        tracing::debug!(%browser, %profile, "Provisioning browser session");
        WebDriverSession::connect(endpoint, browser, caps).await
    }
}
