//! Post-login outcome classification

use std::fmt;

use serde::{Serialize, Serializer};

/// Page-content keywords that signal a successful login
pub const SUCCESS_KEYWORDS: &[&str] = &["welcome", "dashboard", "logged in", "successfully"];

/// Page-content keywords that force a failed verdict
pub const FAILURE_KEYWORDS: &[&str] = &["error", "invalid", "incorrect", "failed", "wrong password"];

/// Result of one login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failed,
    /// The attempt could not be carried out; the page was not understood
    Error(String),
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Lower-case class name without the error message
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failed => write!(f, "Failed"),
            Self::Error(message) => write!(f, "Error: {message}"),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classify the page reached after submitting the form
///
/// Failure keywords in the content win over every success signal. When
/// neither kind of signal is present the attempt counts as rejected.
pub fn classify(url: &str, content: &str, indicators: &[String]) -> Verdict {
    let url = url.to_lowercase();
    let content = content.to_lowercase();

    if FAILURE_KEYWORDS.iter().any(|k| content.contains(k)) {
        return Verdict::Failed;
    }

    let indicated = indicators
        .iter()
        .map(|i| i.trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .any(|i| url.contains(&i));

    if indicated || SUCCESS_KEYWORDS.iter().any(|k| content.contains(k)) {
        Verdict::Success
    } else {
        Verdict::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_indicator_in_url_is_success() {
        let verdict = classify(
            "https://practice.test/Logged-In-Successfully/",
            "<h1>Congratulations</h1>",
            &indicators(&["logged-in-successfully"]),
        );
        assert_eq!(verdict, Verdict::Success);
    }

    #[test]
    fn test_success_keyword_in_content() {
        let verdict = classify("https://site.test/login", "Welcome back, student", &[]);
        assert_eq!(verdict, Verdict::Success);
    }

    #[test]
    fn test_failure_keyword_beats_success_keyword() {
        let verdict = classify(
            "https://site.test/login",
            "Dashboard preview - Invalid credentials",
            &[],
        );
        assert_eq!(verdict, Verdict::Failed);
    }

    #[test]
    fn test_failure_keyword_beats_url_indicator() {
        let verdict = classify(
            "https://site.test/dashboard",
            "Wrong password",
            &indicators(&["dashboard"]),
        );
        assert_eq!(verdict, Verdict::Failed);
    }

    #[test]
    fn test_silence_defaults_to_failed() {
        let verdict = classify(
            "https://site.test/login",
            "<form>Please sign in</form>",
            &indicators(&["account"]),
        );
        assert_eq!(verdict, Verdict::Failed);
    }

    #[test]
    fn test_blank_indicator_does_not_match_everything() {
        let verdict = classify("https://site.test/login", "Please sign in", &indicators(&["", "  "]));
        assert_eq!(verdict, Verdict::Failed);
    }

    #[test]
    fn test_verdict_display_and_serialize() {
        assert_eq!(Verdict::Success.to_string(), "Success");
        assert_eq!(Verdict::Failed.to_string(), "Failed");
        let error = Verdict::Error("Login button not found".into());
        assert_eq!(error.to_string(), "Error: Login button not found");
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            "\"Error: Login button not found\""
        );
        assert_eq!(error.label(), "error");
    }
}
