//! WebDriver-backed browser session
//!
//! Thin adapter from [`BrowserSession`] onto a `fantoccini` client. Every
//! driver error is mapped into the crate error so the engine can turn it into
//! a test verdict.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value};

use super::{BrowserKind, BrowserSession, Locator, PageElement, Selector};
use crate::common::{Error, Result};

/// A browser driven through a WebDriver server
pub struct WebDriverSession {
    client: Client,
    browser: BrowserKind,
}

impl WebDriverSession {
    /// Open a new session on the WebDriver server at `endpoint`
    pub async fn connect(
        endpoint: &str,
        browser: BrowserKind,
        capabilities: Map<String, Value>,
    ) -> Result<Self> {
        tracing::debug!(%endpoint, %browser, "Connecting to WebDriver");

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(endpoint)
            .await
            .map_err(|e| Error::session_provision(browser, e))?;

        tracing::info!(%endpoint, %browser, "Browser session started");

        Ok(Self { client, browser })
    }

    pub fn browser(&self) -> BrowserKind {
        self.browser
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| Error::navigation(url, e))
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.client.current_url().await.map_err(Error::webdriver)?;
        Ok(url.to_string())
    }

    async fn page_source(&self) -> Result<String> {
        self.client.source().await.map_err(Error::webdriver)
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<WebElement>> {
        let found = match locator.selector() {
            Selector::Css(css) => {
                self.client
                    .find_all(fantoccini::Locator::Css(&css))
                    .await
            }
            Selector::XPath(xpath) => {
                self.client
                    .find_all(fantoccini::Locator::XPath(&xpath))
                    .await
            }
        };

        let elements = found.map_err(Error::webdriver)?;
        Ok(elements.into_iter().map(WebElement).collect())
    }

    async fn quit(self) -> Result<()> {
        let browser = self.browser;
        self.client.close().await.map_err(Error::webdriver)?;
        tracing::debug!(%browser, "Browser session closed");
        Ok(())
    }
}

/// An element handle from a live WebDriver session
pub struct WebElement(Element);

#[async_trait]
impl PageElement for WebElement {
    async fn clear(&self) -> Result<()> {
        self.0.clear().await.map_err(Error::webdriver)
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.0.send_keys(text).await.map_err(Error::webdriver)
    }

    async fn click(&self) -> Result<()> {
        self.0.click().await.map_err(Error::webdriver)
    }

    async fn text(&self) -> Result<String> {
        self.0.text().await.map_err(Error::webdriver)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        self.0.attr(name).await.map_err(Error::webdriver)
    }

    async fn is_displayed(&self) -> Result<bool> {
        self.0.is_displayed().await.map_err(Error::webdriver)
    }
}
