//! Best-effort session reset between test cases

use std::time::Duration;

use serde::Serialize;

use crate::browser::{BrowserSession, Locator, PageElement};
use crate::common::Result;

/// How the session was returned to a reusable state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum LogoutStatus {
    /// A visible logout link or button was clicked
    ClickedControl,
    /// The configured logout URL was visited
    VisitedLogoutUrl,
    /// The current page was reloaded; the user may still be logged in
    Refreshed,
    /// Even the reload failed
    Failed(String),
}

impl LogoutStatus {
    /// Whether the session is known to be logged out
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::ClickedControl | Self::VisitedLogoutUrl)
    }
}

/// Log out of the current site, falling back to a page reload
///
/// Never fails: problems degrade the returned status instead.
pub async fn reset<S: BrowserSession>(
    session: &S,
    logout_url: Option<&str>,
    settle: Duration,
) -> LogoutStatus {
    match explicit_logout(session, logout_url).await {
        Ok(Some(status)) => {
            tokio::time::sleep(settle).await;
            status
        }
        Ok(None) => reload(session, settle).await,
        Err(e) => {
            tracing::warn!(error = %e, "Logout failed, reloading page instead");
            reload(session, settle).await
        }
    }
}

async fn explicit_logout<S: BrowserSession>(
    session: &S,
    logout_url: Option<&str>,
) -> Result<Option<LogoutStatus>> {
    for control in session.find_all(&Locator::LogoutControl).await? {
        if control.is_displayed().await.unwrap_or(false) {
            control.click().await?;
            return Ok(Some(LogoutStatus::ClickedControl));
        }
    }

    if let Some(url) = logout_url {
        session.navigate(url).await?;
        return Ok(Some(LogoutStatus::VisitedLogoutUrl));
    }

    Ok(None)
}

async fn reload<S: BrowserSession>(session: &S, settle: Duration) -> LogoutStatus {
    match navigate_to_current(session).await {
        Ok(()) => {
            tokio::time::sleep(settle).await;
            tracing::debug!("No logout control or URL, page reloaded");
            LogoutStatus::Refreshed
        }
        Err(e) => {
            tracing::warn!(error = %e, "Page reload after logout failed");
            LogoutStatus::Failed(e.to_string())
        }
    }
}

async fn navigate_to_current<S: BrowserSession>(session: &S) -> Result<()> {
    let url = session.current_url().await?;
    session.navigate(&url).await
}
