//! Browser group runner
//!
//! Cases are partitioned by browser and each group runs sequentially on one
//! session at a time. The session is kept while consecutive cases share a
//! login URL and replaced when the URL changes.

use crate::browser::{BrowserKind, BrowserSession, SessionFactory, SessionProfile};
use crate::common::{Error, Result};
use crate::engine::{FormEngine, TestOutcome};
use crate::report::{GroupSummary, RunReport};
use crate::suite::TestCase;

/// Receives progress notifications while a run is in flight
pub trait RunObserver: Send + Sync {
    fn group_started(&self, _browser: BrowserKind, _cases: usize) {}

    fn case_finished(&self, _outcome: &TestOutcome) {}

    fn group_abandoned(&self, _browser: BrowserKind, _reason: &Error, _skipped: usize) {}
}

/// Observer that ignores everything
pub struct Silent;

impl RunObserver for Silent {}

/// Partition `cases` by browser, keeping first-appearance order of browsers
/// and original order of cases within each browser
pub fn group_by_browser(cases: &[TestCase]) -> Vec<(BrowserKind, Vec<&TestCase>)> {
    let mut groups: Vec<(BrowserKind, Vec<&TestCase>)> = Vec::new();
    for case in cases {
        let browser = case.browser();
        match groups.iter_mut().find(|(kind, _)| *kind == browser) {
            Some((_, members)) => members.push(case),
            None => groups.push((browser, vec![case])),
        }
    }
    groups
}

/// Start a session, falling back to the minimal capability set
pub async fn open_session<F: SessionFactory>(factory: &F, browser: BrowserKind) -> Result<F::Session> {
    match factory.provision(browser, SessionProfile::Standard).await {
        Ok(session) => Ok(session),
        Err(e) => {
            tracing::warn!(%browser, error = %e, "Standard session failed, retrying with minimal capabilities");
            factory.provision(browser, SessionProfile::Minimal).await
        }
    }
}

/// Runs a list of cases against sessions from `F`
pub struct Runner<F: SessionFactory> {
    factory: F,
    engine: FormEngine,
    default_url: Option<String>,
    observer: Box<dyn RunObserver>,
}

impl<F: SessionFactory> Runner<F> {
    pub fn new(factory: F, engine: FormEngine) -> Self {
        Self {
            factory,
            engine,
            default_url: None,
            observer: Box::new(Silent),
        }
    }

    /// Login URL for cases that do not name one
    pub fn with_default_url(mut self, url: Option<String>) -> Self {
        self.default_url = url;
        self
    }

    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Execute every case and collect the report
    ///
    /// A group whose session cannot be started is abandoned: its remaining
    /// cases produce no outcome and the group summary records why.
    pub async fn run(&self, cases: &[TestCase]) -> RunReport {
        let mut outcomes = Vec::with_capacity(cases.len());
        let mut groups = Vec::new();

        for (browser, members) in group_by_browser(cases) {
            let mut summary = GroupSummary::new(browser, members.len());
            self.observer.group_started(browser, members.len());
            tracing::info!(%browser, cases = members.len(), "Starting browser group");

            if let Err(e) = self
                .run_group(browser, &members, &mut summary, &mut outcomes)
                .await
            {
                let skipped = summary.missing();
                tracing::error!(%browser, error = %e, skipped, "Browser group abandoned");
                self.observer.group_abandoned(browser, &e, skipped);
                summary.abandoned = Some(e.to_string());
            }

            groups.push(summary);
        }

        RunReport::new(groups, outcomes)
    }

    async fn run_group(
        &self,
        browser: BrowserKind,
        cases: &[&TestCase],
        summary: &mut GroupSummary,
        outcomes: &mut Vec<TestOutcome>,
    ) -> Result<()> {
        let mut current: Option<(F::Session, String)> = None;

        for case in cases {
            let outcome = match case.resolve_target_url(self.default_url.as_deref()) {
                None => TestOutcome::error(
                    case,
                    Error::NoTargetUrl {
                        id: case.id.clone(),
                    }
                    .to_string(),
                ),
                Some(url) => {
                    let active = current.as_ref().map(|(_, active)| active.as_str());
                    if active != Some(url.as_str()) {
                        if let Some((stale, previous)) = current.take() {
                            tracing::debug!(%browser, from = %previous, to = %url, "Login URL changed, recycling session");
                            self.retire(browser, stale).await;
                        }
                        current = Some((open_session(&self.factory, browser).await?, url.clone()));
                    }
                    let Some((session, _)) = current.as_ref() else {
                        continue;
                    };
                    self.engine.execute(session, case, &url).await
                }
            };

            summary.record(&outcome);
            self.observer.case_finished(&outcome);
            outcomes.push(outcome);
        }

        if let Some((session, _)) = current.take() {
            self.retire(browser, session).await;
        }
        Ok(())
    }

    async fn retire(&self, browser: BrowserKind, session: F::Session) {
        if let Err(e) = session.quit().await {
            tracing::warn!(%browser, error = %e, "Failed to close browser session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeFactory, FakePage, FakeSite};
    use crate::engine::{Timings, Verdict};
    use crate::suite::TestSuite;

    fn cases(yaml: &str) -> Vec<TestCase> {
        TestSuite::from_yaml(yaml).unwrap().cases
    }

    fn runner(factory: FakeFactory) -> Runner<FakeFactory> {
        Runner::new(factory, FormEngine::new(Timings::immediate()))
    }

    #[test]
    fn test_group_by_browser_keeps_first_appearance_order() {
        let cases = cases(
            r#"
- {id: a, username: u, password: p, browser: firefox}
- {id: b, username: u, password: p}
- {id: c, username: u, password: p, browser: Firefox}
- {id: d, username: u, password: p, browser: chrome}
"#,
        );
        let groups = group_by_browser(&cases);
        let summary: Vec<(BrowserKind, Vec<&str>)> = groups
            .iter()
            .map(|(kind, members)| (*kind, members.iter().map(|c| c.id.as_str()).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (BrowserKind::Firefox, vec!["a", "c"]),
                (BrowserKind::Chrome, vec!["b", "d"]),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_url_is_error_outcome() {
        let runner = runner(FakeFactory::new(FakeSite::new()));
        let report = runner
            .run(&cases("- {id: x, username: u, password: p}"))
            .await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(
            report.outcomes[0].verdict,
            Verdict::Error("No target URL configured for test case x".to_string())
        );
        assert!(runner.factory().provisioned().is_empty());
    }

    #[tokio::test]
    async fn test_session_recycled_only_on_url_change() {
        let site = FakeSite::new()
            .page("https://a.test/", FakePage::login_form())
            .page("https://b.test/", FakePage::login_form());
        let runner = runner(FakeFactory::new(site)).with_default_url(Some("https://a.test/".into()));

        let report = runner
            .run(&cases(
                r#"
- {id: 1, username: u, password: p}
- {id: 2, username: u, password: p}
- {id: 3, username: u, password: p, target_url: "https://b.test/"}
"#,
            ))
            .await;

        assert_eq!(report.outcomes.len(), 3);
        let sessions = runner.factory().provisioned();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|(_, _, session)| session.is_quit()));
    }

    #[tokio::test]
    async fn test_refused_browser_abandons_only_its_group() {
        let site = FakeSite::new().page("https://a.test/", FakePage::login_form());
        let runner = runner(FakeFactory::new(site).refuse(BrowserKind::Edge))
            .with_default_url(Some("https://a.test/".into()));

        let cases = cases(
            r#"
- {id: 1, username: u, password: p, browser: edge}
- {id: 2, username: u, password: p, browser: edge}
- {id: 3, username: u, password: p}
"#,
        );
        let report = runner.run(&cases).await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].id, "3");
        assert_eq!(report.groups[0].browser, BrowserKind::Edge);
        assert_eq!(report.groups[0].missing(), 2);
        assert!(report.groups[0].abandoned.is_some());
        assert_eq!(report.outcomes.len() + report.skipped(), cases.len());
    }
}
