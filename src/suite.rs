//! Test suite configuration types
//!
//! Defines the test case descriptors and the YAML/JSON suite files they are
//! loaded from.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::browser::BrowserKind;
use crate::common::{Error, Result};
use crate::engine::Role;

/// Indicators used when a test case does not list any
pub const DEFAULT_SUCCESS_INDICATORS: &[&str] = &["dashboard", "home", "profile", "welcome", "index"];

/// A suite file: shared defaults plus the cases to run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestSuite {
    /// Optional suite name shown in the run header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Login page used by cases without their own URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// The test cases, in execution order within each browser
    pub cases: Vec<TestCase>,
}

/// Suite files may also be a bare list of cases
#[derive(Deserialize)]
#[serde(untagged)]
enum SuiteFile {
    Suite(TestSuite),
    Cases(Vec<TestCase>),
}

/// One login test
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestCase {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Login page; falls back to the suite and configured defaults
    #[serde(default, alias = "website_url", skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(flatten)]
    pub locator_hints: LocatorHints,
    /// URL substrings that mark a successful login
    #[serde(
        default = "default_success_indicators",
        deserialize_with = "indicator_list"
    )]
    pub success_indicators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_url: Option<String>,
    /// Expected verdict, for reporting only
    #[serde(default, alias = "expected")]
    pub expected_result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserKind>,
}

/// Login credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(deserialize_with = "string_or_number")]
    pub username: String,
    #[serde(deserialize_with = "string_or_number")]
    pub password: String,
}

/// Strings that bias the locator cascade towards the right controls
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocatorHints {
    #[serde(default = "default_username_hint")]
    pub username_field: String,
    #[serde(default = "default_password_hint")]
    pub password_field: String,
    #[serde(default = "default_submit_hint")]
    pub submit_button: String,
}

impl Default for LocatorHints {
    fn default() -> Self {
        Self {
            username_field: default_username_hint(),
            password_field: default_password_hint(),
            submit_button: default_submit_hint(),
        }
    }
}

fn default_username_hint() -> String {
    Role::Username.default_hint().to_string()
}
fn default_password_hint() -> String {
    Role::Password.default_hint().to_string()
}
fn default_submit_hint() -> String {
    Role::Submit.default_hint().to_string()
}

fn default_success_indicators() -> Vec<String> {
    DEFAULT_SUCCESS_INDICATORS.iter().map(|s| s.to_string()).collect()
}

/// Accept either a list or one comma-separated string; drop blank entries
fn indicator_list<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Indicators {
        List(Vec<String>),
        Joined(String),
    }

    let raw = match Indicators::deserialize(deserializer)? {
        Indicators::List(list) => list,
        Indicators::Joined(joined) => joined.split(',').map(str::to_string).collect(),
    };
    Ok(raw
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Spreadsheet-born suites often carry numeric ids and passwords
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
    })
}

impl TestCase {
    /// Hint for the given role; a blank hint falls back to the role default
    pub fn hint(&self, role: Role) -> &str {
        let hint = match role {
            Role::Username => &self.locator_hints.username_field,
            Role::Password => &self.locator_hints.password_field,
            Role::Submit => &self.locator_hints.submit_button,
        }
        .trim();
        if hint.is_empty() {
            role.default_hint()
        } else {
            hint
        }
    }

    /// Browser requested by the case, defaulting to Chrome
    pub fn browser(&self) -> BrowserKind {
        self.browser.unwrap_or_default()
    }

    /// Login page for this case, or `fallback`
    pub fn resolve_target_url(&self, fallback: Option<&str>) -> Option<String> {
        self.target_url
            .as_deref()
            .or(fallback)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}

/// Defaults applied to every case that leaves a field unset
#[derive(Debug, Clone, Default)]
pub struct CaseDefaults {
    pub target_url: Option<String>,
    pub browser: Option<BrowserKind>,
    /// Replaces the browser of every case when set
    pub force_browser: Option<BrowserKind>,
}

impl TestSuite {
    /// Load a suite from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let suite = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        suite.validate()?;
        Ok(suite)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: SuiteFile = serde_yaml::from_str(content)
            .map_err(|e| Error::Suite(format!("Failed to parse test suite: {}", e)))?;
        Ok(file.into())
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: SuiteFile = serde_json::from_str(content)
            .map_err(|e| Error::Suite(format!("Failed to parse test suite: {}", e)))?;
        Ok(file.into())
    }

    /// Reject empty and duplicate ids
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for case in &self.cases {
            if case.id.trim().is_empty() {
                return Err(Error::Suite("Test case with empty id".to_string()));
            }
            if !seen.insert(case.id.as_str()) {
                return Err(Error::Suite(format!("Duplicate test case id '{}'", case.id)));
            }
        }
        Ok(())
    }

    /// Resolve suite-level and configured defaults into the cases
    pub fn into_cases(self, defaults: &CaseDefaults) -> Vec<TestCase> {
        let fallback_url = self.target_url.or_else(|| defaults.target_url.clone());
        self.cases
            .into_iter()
            .map(|mut case| {
                if case.target_url.is_none() {
                    case.target_url = fallback_url.clone();
                }
                if let Some(forced) = defaults.force_browser {
                    case.browser = Some(forced);
                } else if case.browser.is_none() {
                    case.browser = defaults.browser;
                }
                case
            })
            .collect()
    }

    /// Example suite written by `login-harness template`
    pub fn template() -> Self {
        let base = "https://practicetestautomation.com/practice-test-login/";
        let case = |id: &str, description: &str, username: &str, password: &str, expected: &str| {
            TestCase {
                id: id.to_string(),
                description: description.to_string(),
                target_url: None,
                credentials: Credentials {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                locator_hints: LocatorHints::default(),
                success_indicators: vec!["logged-in-successfully".to_string()],
                logout_url: None,
                expected_result: expected.to_string(),
                browser: None,
            }
        };

        let mut firefox = case("TC003", "Valid login in Firefox", "student", "Password123", "Success");
        firefox.browser = Some(BrowserKind::Firefox);

        Self {
            name: Some("Practice login".to_string()),
            target_url: Some(base.to_string()),
            cases: vec![
                case("TC001", "Valid credentials", "student", "Password123", "Success"),
                case("TC002", "Wrong password", "student", "incorrectPassword", "Failed"),
                firefox,
            ],
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Suite(e.to_string()))
    }
}

impl From<SuiteFile> for TestSuite {
    fn from(file: SuiteFile) -> Self {
        match file {
            SuiteFile::Suite(suite) => suite,
            SuiteFile::Cases(cases) => Self {
                name: None,
                target_url: None,
                cases,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SUITE: &str = r#"
name: Staging login
target_url: https://staging.test/login
cases:
  - id: TC001
    description: Valid credentials
    username: student
    password: Password123
    success_indicators: [logged-in-successfully]
    expected_result: Success
  - id: 2
    username: admin
    password: 12345
    username_field: email
    submit_button: Sign in
    success_indicators: "dashboard, , home"
    website_url: https://other.test/
    logout_url: https://other.test/logout
    browser: Firefox
"#;

    #[test]
    fn test_parse_yaml_suite() {
        let suite = TestSuite::from_yaml(SUITE).unwrap();
        assert_eq!(suite.name.as_deref(), Some("Staging login"));
        assert_eq!(suite.cases.len(), 2);

        let first = &suite.cases[0];
        assert_eq!(first.id, "TC001");
        assert_eq!(first.credentials.username, "student");
        assert_eq!(first.hint(Role::Username), "username");
        assert_eq!(first.hint(Role::Submit), "login");
        assert_eq!(first.success_indicators, vec!["logged-in-successfully"]);
        assert_eq!(first.browser(), BrowserKind::Chrome);

        let second = &suite.cases[1];
        assert_eq!(second.id, "2");
        assert_eq!(second.credentials.password, "12345");
        assert_eq!(second.hint(Role::Username), "email");
        assert_eq!(second.hint(Role::Password), "password");
        assert_eq!(second.hint(Role::Submit), "Sign in");
        assert_eq!(second.success_indicators, vec!["dashboard", "home"]);
        assert_eq!(second.target_url.as_deref(), Some("https://other.test/"));
        assert_eq!(second.browser(), BrowserKind::Firefox);
    }

    #[test]
    fn test_blank_hints_fall_back_to_role_defaults() {
        let suite = TestSuite::from_yaml(
            "- {id: a, username: u, password: p, username_field: '  ', submit_button: ''}",
        )
        .unwrap();
        let case = &suite.cases[0];
        assert_eq!(case.hint(Role::Username), "username");
        assert_eq!(case.hint(Role::Password), "password");
        assert_eq!(case.hint(Role::Submit), "login");
    }

    #[test]
    fn test_missing_indicators_use_defaults() {
        let suite = TestSuite::from_yaml("- {id: a, username: u, password: p}").unwrap();
        assert_eq!(suite.cases[0].success_indicators, default_success_indicators());
        assert!(suite.name.is_none());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = TestSuite::from_yaml("cases:\n  - id: a\n    username: u\n").unwrap_err();
        assert!(matches!(err, Error::Suite(_)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let suite = TestSuite::from_yaml(
            "- {id: a, username: u, password: p}\n- {id: a, username: v, password: q}",
        )
        .unwrap();
        assert!(suite.validate().is_err());
    }

    #[test]
    fn test_into_cases_applies_defaults() {
        let suite = TestSuite::from_yaml(SUITE).unwrap();
        let cases = suite.clone().into_cases(&CaseDefaults {
            target_url: Some("https://ignored.test/".to_string()),
            browser: Some(BrowserKind::Edge),
            force_browser: None,
        });
        assert_eq!(cases[0].target_url.as_deref(), Some("https://staging.test/login"));
        assert_eq!(cases[0].browser(), BrowserKind::Edge);
        assert_eq!(cases[1].browser(), BrowserKind::Firefox);

        let forced = suite.into_cases(&CaseDefaults {
            force_browser: Some(BrowserKind::Chrome),
            ..Default::default()
        });
        assert!(forced.iter().all(|c| c.browser() == BrowserKind::Chrome));
    }

    #[test]
    fn test_resolve_target_url_ignores_blank() {
        let mut case = TestSuite::template().cases.remove(0);
        case.target_url = Some("  ".to_string());
        assert_eq!(case.resolve_target_url(Some("https://x.test/")), None);

        case.target_url = None;
        assert_eq!(
            case.resolve_target_url(Some("https://x.test/")).as_deref(),
            Some("https://x.test/")
        );
        assert_eq!(case.resolve_target_url(None), None);
    }

    #[test]
    fn test_load_json_and_template_round_trip() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"cases": [{{"id": "J1", "username": "u", "password": "p", "browser": "edge"}}]}}"#
        )
        .unwrap();
        let suite = TestSuite::load(file.path()).unwrap();
        assert_eq!(suite.cases[0].browser(), BrowserKind::Edge);

        let yaml = TestSuite::template().to_yaml().unwrap();
        let reparsed = TestSuite::from_yaml(&yaml).unwrap();
        assert_eq!(reparsed.cases.len(), 3);
        assert_eq!(reparsed.cases[2].browser(), BrowserKind::Firefox);
    }
}
