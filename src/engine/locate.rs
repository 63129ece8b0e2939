//! Locator cascade
//!
//! Each role has a strictly ordered list of strategies. Hint-based exact
//! matches come first and generic heuristics last; the first strategy that
//! returns anything wins and later ones are never tried.

use std::fmt;

use serde::Serialize;

use crate::browser::{BrowserSession, Locator};
use crate::common::{Error, Result};

/// The form control being looked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Username,
    Password,
    Submit,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Username, Role::Password, Role::Submit];

    /// Hint used when a test case does not provide one
    pub fn default_hint(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Submit => "login",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => write!(f, "Username input field"),
            Self::Password => write!(f, "Password input field"),
            Self::Submit => write!(f, "Login button"),
        }
    }
}

/// The ordered strategy list for `role`, biased by `hint`
pub fn strategies(role: Role, hint: &str) -> Vec<Locator> {
    let hint = hint.to_string();
    match role {
        Role::Username => vec![
            Locator::Name(hint.clone()),
            Locator::Id(hint.clone()),
            Locator::NameOrId(hint.clone()),
            Locator::Placeholder(hint),
            Locator::TextLikeInput,
            Locator::LabelledInput(&["username", "email"]),
        ],
        Role::Password => vec![
            Locator::Name(hint.clone()),
            Locator::Id(hint.clone()),
            Locator::NameOrId(hint.clone()),
            Locator::Placeholder(hint),
            Locator::InputType("password".to_string()),
            Locator::LabelledInput(&["password"]),
        ],
        Role::Submit => vec![
            Locator::Name(hint.clone()),
            Locator::Id(hint.clone()),
            Locator::ButtonText(hint.clone()),
            Locator::InputValue(hint),
            Locator::SubmitControl("button"),
            Locator::SubmitControl("input"),
            Locator::ButtonKeywords(&["login", "log in", "sign in"]),
            Locator::InputValueKeywords(&["Login", "Log In", "Sign In", "Submit"]),
        ],
    }
}

/// An element found by the cascade
pub struct Located<E> {
    pub element: E,
    /// The strategy that matched
    pub strategy: Locator,
    /// Zero-based position of that strategy in the cascade
    pub rank: usize,
}

/// Run the cascade for `role` on the current page
///
/// A strategy whose lookup errors counts as "no match".
pub async fn locate<S: BrowserSession>(
    session: &S,
    role: Role,
    hint: &str,
) -> Result<Located<S::Element>> {
    for (rank, strategy) in strategies(role, hint).into_iter().enumerate() {
        match session.find_all(&strategy).await {
            Ok(found) => {
                if let Some(element) = found.into_iter().next() {
                    tracing::debug!(?role, %strategy, rank, "Element located");
                    return Ok(Located {
                        element,
                        strategy,
                        rank,
                    });
                }
                tracing::trace!(?role, %strategy, "No match");
            }
            Err(e) => {
                tracing::debug!(?role, %strategy, error = %e, "Strategy failed, trying next");
            }
        }
    }

    Err(Error::ElementNotFound(role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeElement, FakePage, FakeSession, FakeSite};
    use crate::browser::PageElement;

    const URL: &str = "https://site.test/login";

    fn session_on(page: FakePage) -> FakeSession {
        FakeSession::at(FakeSite::new().page(URL, page), URL)
    }

    #[test]
    fn test_cascade_orders() {
        let username = strategies(Role::Username, "user");
        assert_eq!(username.first(), Some(&Locator::Name("user".into())));
        assert_eq!(
            username.last(),
            Some(&Locator::LabelledInput(&["username", "email"]))
        );

        let password = strategies(Role::Password, "pw");
        assert_eq!(password[4], Locator::InputType("password".into()));

        let submit = strategies(Role::Submit, "go");
        assert_eq!(submit.len(), 8);
        assert_eq!(submit[2], Locator::ButtonText("go".into()));
        assert_eq!(submit[4], Locator::SubmitControl("button"));
        assert_eq!(submit[5], Locator::SubmitControl("input"));
    }

    #[tokio::test]
    async fn test_name_match_beats_generic_password_input() {
        let page = FakePage::new()
            .with(FakeElement::input("password").attr("name", "decoy"))
            .with(FakeElement::input("text").attr("name", "pass_field"));
        let session = session_on(page);

        let found = locate(&session, Role::Password, "pass_field").await.unwrap();
        assert_eq!(found.rank, 0);
        assert_eq!(found.strategy, Locator::Name("pass_field".into()));
        assert_eq!(
            found.element.attr("name").await.unwrap().as_deref(),
            Some("pass_field")
        );
    }

    #[tokio::test]
    async fn test_falls_through_to_generic_strategy() {
        let page = FakePage::new()
            .with(FakeElement::input("email").attr("name", "login_mail"))
            .with(FakeElement::input("password").attr("name", "secret"));
        let session = session_on(page);

        let username = locate(&session, Role::Username, "username").await.unwrap();
        assert_eq!(username.strategy, Locator::TextLikeInput);

        let password = locate(&session, Role::Password, "password").await.unwrap();
        assert_eq!(password.strategy, Locator::InputType("password".into()));
    }

    #[tokio::test]
    async fn test_label_strategy_is_last_resort() {
        let page = FakePage::new()
            .with(FakeElement::label("Your Username"))
            .with(FakeElement::input("tel").attr("name", "u"));
        let session = session_on(page);

        let found = locate(&session, Role::Username, "username").await.unwrap();
        assert_eq!(found.rank, 5);
    }

    #[tokio::test]
    async fn test_erroring_strategy_counts_as_no_match() {
        let page = FakePage::new().with(FakeElement::input("text").attr("id", "username"));
        let session = session_on(page);
        session.break_locator(Locator::Name("username".into()));

        let found = locate(&session, Role::Username, "username").await.unwrap();
        assert_eq!(found.strategy, Locator::Id("username".into()));
    }

    #[tokio::test]
    async fn test_submit_by_button_text_ignores_case() {
        let page = FakePage::new()
            .with(FakeElement::button("Cancel").attr("type", "button"))
            .with(FakeElement::button("SIGN IN NOW").attr("type", "button"));
        let session = session_on(page);

        let found = locate(&session, Role::Submit, "sign in").await.unwrap();
        assert_eq!(found.strategy, Locator::ButtonText("sign in".into()));
        assert_eq!(found.element.text().await.unwrap(), "SIGN IN NOW");
    }

    #[tokio::test]
    async fn test_exhausted_cascade_reports_role() {
        let session = session_on(FakePage::new().body("Nothing to see"));

        let err = locate(&session, Role::Username, "username").await.err().unwrap();
        assert!(matches!(err, Error::ElementNotFound(Role::Username)));
        assert_eq!(err.to_string(), "Username input field not found");
    }
}
