//! Form interaction engine
//!
//! Drives one login test case against an already-open browser session:
//! load the login page, find the three controls, submit the credentials,
//! classify where the browser landed, then reset the session.

mod classify;
pub mod locate;
mod logout;
pub mod wait;

use std::time::Duration;

use serde::Serialize;

use crate::browser::{BrowserKind, BrowserSession, Locator, PageElement};
use crate::common::config::TimingsConfig;
use crate::common::Result;
use crate::suite::TestCase;

pub use classify::{classify, Verdict, FAILURE_KEYWORDS, SUCCESS_KEYWORDS};
pub use locate::{locate, strategies, Located, Role};
pub use logout::{reset, LogoutStatus};

/// Settle delays and wait budgets used while driving a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub navigation_settle: Duration,
    pub submit_settle: Duration,
    pub logout_settle: Duration,
    pub explicit_wait: Duration,
    pub poll_interval: Duration,
}

impl Timings {
    /// No delays at all, for in-memory sessions
    pub fn immediate() -> Self {
        Self {
            navigation_settle: Duration::ZERO,
            submit_settle: Duration::ZERO,
            logout_settle: Duration::ZERO,
            explicit_wait: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        TimingsConfig::default().to_timings()
    }
}

/// The recorded result of one test case
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub id: String,
    pub description: String,
    pub browser: BrowserKind,
    pub expected_result: String,
    #[serde(rename = "actual_result")]
    pub verdict: Verdict,
    /// How the session was reset; absent when no page was touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_reset: Option<LogoutStatus>,
}

impl TestOutcome {
    /// Build an outcome for a case that never reached the page
    pub fn error(case: &TestCase, message: impl Into<String>) -> Self {
        Self {
            id: case.id.clone(),
            description: case.description.clone(),
            browser: case.browser(),
            expected_result: case.expected_result.clone(),
            verdict: Verdict::Error(message.into()),
            session_reset: None,
        }
    }

    /// Whether the verdict agrees with the expected result, if one was given
    ///
    /// Comparison is on the verdict class by prefix: `success...`/`pass...`,
    /// `fail...` and `error...`, ignoring case. "Error" matches any error.
    pub fn matches_expectation(&self) -> Option<bool> {
        let expected = self.expected_result.trim().to_lowercase();
        let class = if expected.is_empty() {
            return None;
        } else if expected.starts_with("success") || expected.starts_with("pass") {
            "success"
        } else if expected.starts_with("fail") {
            "failed"
        } else if expected.starts_with("error") {
            "error"
        } else {
            return Some(false);
        };
        Some(class == self.verdict.label())
    }
}

/// Executes login test cases on a borrowed session
#[derive(Debug, Clone)]
pub struct FormEngine {
    timings: Timings,
}

impl FormEngine {
    pub fn new(timings: Timings) -> Self {
        Self { timings }
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Run `case` against `target_url`
    ///
    /// Never fails: problems during the attempt become an `Error` verdict.
    /// The session is reset afterwards whatever the verdict.
    #[tracing::instrument(skip_all, fields(case = %case.id))]
    pub async fn execute<S: BrowserSession>(
        &self,
        session: &S,
        case: &TestCase,
        target_url: &str,
    ) -> TestOutcome {
        let verdict = match self.attempt(session, case, target_url).await {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(error = %e, "Login attempt aborted");
                Verdict::Error(e.to_string())
            }
        };
        tracing::info!(%verdict, "Login attempt classified");

        let session_reset = reset(
            session,
            case.logout_url.as_deref(),
            self.timings.logout_settle,
        )
        .await;

        TestOutcome {
            id: case.id.clone(),
            description: case.description.clone(),
            browser: case.browser(),
            expected_result: case.expected_result.clone(),
            verdict,
            session_reset: Some(session_reset),
        }
    }

    async fn attempt<S: BrowserSession>(
        &self,
        session: &S,
        case: &TestCase,
        target_url: &str,
    ) -> Result<Verdict> {
        self.open_login_page(session, target_url).await?;

        let username = locate(session, Role::Username, case.hint(Role::Username)).await?;
        let password = locate(session, Role::Password, case.hint(Role::Password)).await?;
        let submit = locate(session, Role::Submit, case.hint(Role::Submit)).await?;

        username.element.clear().await?;
        username.element.send_keys(&case.credentials.username).await?;
        password.element.clear().await?;
        password.element.send_keys(&case.credentials.password).await?;

        submit.element.click().await?;
        tokio::time::sleep(self.timings.submit_settle).await;

        let landed = session.current_url().await?;
        let content = session.page_source().await?;
        tracing::debug!(url = %landed, "Form submitted");

        Ok(classify(&landed, &content, &case.success_indicators))
    }

    /// Navigate only when the browser is elsewhere, so a login page reached
    /// through a logout redirect is not reloaded
    async fn open_login_page<S: BrowserSession>(&self, session: &S, target_url: &str) -> Result<()> {
        if session.current_url().await? == target_url {
            return Ok(());
        }

        session.navigate(target_url).await?;
        tokio::time::sleep(self.timings.navigation_settle).await;

        if let Err(e) = wait::element_present(
            session,
            &Locator::AnyInput,
            self.timings.explicit_wait,
            self.timings.poll_interval,
        )
        .await
        {
            tracing::warn!(error = %e, url = target_url, "No input appeared on the login page");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeElement, FakePage, FakeSession, FakeSite};
    use crate::suite::TestSuite;

    const LOGIN: &str = "https://site.test/login";
    const HOME: &str = "https://site.test/dashboard";

    fn case(username: &str, password: &str) -> TestCase {
        let yaml = format!(
            "- {{id: T1, username: {username}, password: {password}, expected_result: Success}}"
        );
        TestSuite::from_yaml(&yaml).unwrap().cases.remove(0)
    }

    fn site() -> FakeSite {
        FakeSite::new()
            .page(LOGIN, FakePage::login_form())
            .page(
                HOME,
                FakePage::new()
                    .with(FakeElement::link("Logout", LOGIN))
                    .body("Hello student"),
            )
            .on_submit(|form| {
                if form.value("password") == Some("secret") {
                    HOME.to_string()
                } else {
                    form.url.clone()
                }
            })
    }

    #[tokio::test]
    async fn test_successful_login_logs_out() {
        let session = FakeSession::new(site());
        let engine = FormEngine::new(Timings::immediate());

        let outcome = engine.execute(&session, &case("student", "secret"), LOGIN).await;

        assert_eq!(outcome.verdict, Verdict::Success);
        assert_eq!(outcome.session_reset, Some(LogoutStatus::ClickedControl));
        assert_eq!(outcome.matches_expectation(), Some(true));
        assert_eq!(
            session.typed(),
            vec![
                ("username".to_string(), "student".to_string()),
                ("password".to_string(), "secret".to_string()),
            ]
        );
        assert_eq!(session.url(), LOGIN);
    }

    #[tokio::test]
    async fn test_rejected_login_is_failed() {
        let session = FakeSession::new(site());
        let engine = FormEngine::new(Timings::immediate());

        let outcome = engine.execute(&session, &case("student", "nope"), LOGIN).await;

        assert_eq!(outcome.verdict, Verdict::Failed);
        assert_eq!(outcome.session_reset, Some(LogoutStatus::Refreshed));
        assert_eq!(outcome.matches_expectation(), Some(false));
    }

    #[tokio::test]
    async fn test_already_on_login_page_skips_navigation() {
        let session = FakeSession::at(site(), LOGIN);
        let engine = FormEngine::new(Timings::immediate());

        engine.execute(&session, &case("student", "secret"), LOGIN).await;

        assert_eq!(session.navigations().first().map(String::as_str), Some(HOME));
    }

    #[tokio::test]
    async fn test_missing_control_is_error_verdict() {
        let site = FakeSite::new().page(
            LOGIN,
            FakePage::new().with(FakeElement::input("password").attr("name", "password")),
        );
        let session = FakeSession::new(site);
        let engine = FormEngine::new(Timings::immediate());

        let outcome = engine.execute(&session, &case("student", "secret"), LOGIN).await;

        assert_eq!(
            outcome.verdict,
            Verdict::Error("Username input field not found".to_string())
        );
        assert!(session.typed().is_empty());
        assert_eq!(outcome.session_reset, Some(LogoutStatus::Refreshed));
    }

    #[tokio::test]
    async fn test_unreachable_page_is_error_verdict() {
        let session = FakeSession::new(FakeSite::new().unreachable(LOGIN));
        let engine = FormEngine::new(Timings::immediate());

        let outcome = engine.execute(&session, &case("student", "secret"), LOGIN).await;

        assert!(matches!(outcome.verdict, Verdict::Error(ref m) if m.contains(LOGIN)));
    }

    #[test]
    fn test_expectation_without_expected_result() {
        let mut outcome = TestOutcome::error(&case("a", "b"), "boom");
        assert_eq!(outcome.matches_expectation(), Some(false));
        outcome.expected_result = "error".to_string();
        assert_eq!(outcome.matches_expectation(), Some(true));
        outcome.verdict = Verdict::Failed;
        outcome.expected_result = "Failure".to_string();
        assert_eq!(outcome.matches_expectation(), Some(true));
        outcome.expected_result = "Pass.".to_string();
        assert_eq!(outcome.matches_expectation(), Some(false));

        outcome.verdict = Verdict::Success;
        for spelling in ["Successful", "Pass.", "passed", "SUCCESS"] {
            outcome.expected_result = spelling.to_string();
            assert_eq!(outcome.matches_expectation(), Some(true), "{spelling}");
        }
        outcome.expected_result = "maybe".to_string();
        assert_eq!(outcome.matches_expectation(), Some(false));
        outcome.expected_result.clear();
        assert_eq!(outcome.matches_expectation(), None);
    }

    #[test]
    fn test_default_timings() {
        let timings = Timings::default();
        assert_eq!(timings.submit_settle, Duration::from_secs(3));
        assert_eq!(timings.explicit_wait, Duration::from_secs(10));
    }
}
