//! Read-only page inspection
//!
//! Lists the inputs of a login page and shows which cascade strategy would
//! pick each control with the default hints. Nothing is typed or submitted.

use serde::Serialize;

use crate::browser::{BrowserSession, Locator, PageElement};
use crate::common::Result;
use crate::engine::{locate, wait, Role, Timings};

/// One `input` element as seen on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub id: Option<String>,
    /// Placeholder, or the aria-label when there is no placeholder
    pub label: Option<String>,
}

/// The strategy the cascade settled on for one role
#[derive(Debug, Clone, Serialize)]
pub struct RolePick {
    pub role: Role,
    /// Display form of the winning strategy, `None` when nothing matched
    pub strategy: Option<String>,
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageInventory {
    pub url: String,
    pub inputs: Vec<InputSummary>,
    pub picks: Vec<RolePick>,
}

pub async fn inspect<S: BrowserSession>(
    session: &S,
    url: &str,
    timings: &Timings,
) -> Result<PageInventory> {
    session.navigate(url).await?;
    tokio::time::sleep(timings.navigation_settle).await;
    if wait::element_present(session, &Locator::AnyInput, timings.explicit_wait, timings.poll_interval)
        .await
        .is_err()
    {
        tracing::warn!(url, "No input elements found");
    }

    let mut inputs = Vec::new();
    for element in session.find_all(&Locator::AnyInput).await? {
        inputs.push(summarize(&element).await?);
    }

    let mut picks = Vec::with_capacity(Role::ALL.len());
    for role in Role::ALL {
        let pick = match locate(session, role, role.default_hint()).await {
            Ok(found) => RolePick {
                role,
                strategy: Some(found.strategy.to_string()),
                rank: Some(found.rank),
            },
            Err(_) => RolePick {
                role,
                strategy: None,
                rank: None,
            },
        };
        picks.push(pick);
    }

    Ok(PageInventory {
        url: session.current_url().await?,
        inputs,
        picks,
    })
}

async fn summarize<E: PageElement>(element: &E) -> Result<InputSummary> {
    let label = match element.attr("placeholder").await? {
        Some(placeholder) if !placeholder.is_empty() => Some(placeholder),
        _ => element.attr("aria-label").await?,
    };
    Ok(InputSummary {
        kind: element.attr("type").await?.unwrap_or_else(|| "text".to_string()),
        name: element.attr("name").await?,
        id: element.attr("id").await?,
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeElement, FakePage, FakeSession, FakeSite};

    #[tokio::test]
    async fn test_inventory_lists_inputs_and_picks() {
        let url = "https://site.test/signin";
        let page = FakePage::new()
            .with(FakeElement::new("input").attr("id", "email").attr("aria-label", "E-mail"))
            .with(
                FakeElement::input("password")
                    .attr("name", "pw")
                    .attr("placeholder", "Password"),
            )
            .with(FakeElement::input("submit").attr("value", "Sign In"));
        let session = FakeSession::new(FakeSite::new().page(url, page));

        let inventory = inspect(&session, url, &Timings::immediate()).await.unwrap();

        assert_eq!(inventory.inputs.len(), 3);
        assert_eq!(
            inventory.inputs[0],
            InputSummary {
                kind: "text".to_string(),
                name: None,
                id: Some("email".to_string()),
                label: Some("E-mail".to_string()),
            }
        );
        assert_eq!(inventory.inputs[1].label.as_deref(), Some("Password"));

        let ranks: Vec<Option<usize>> = inventory.picks.iter().map(|p| p.rank).collect();
        // email id only matches the generic text-like heuristic
        assert_eq!(ranks, vec![Some(4), Some(4), Some(5)]);
        assert!(session.typed().is_empty());
        assert!(session.clicked().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_role_has_no_pick() {
        let url = "https://site.test/empty";
        let session = FakeSession::new(FakeSite::new().page(url, FakePage::new().body("Maintenance")));

        let inventory = inspect(&session, url, &Timings::immediate()).await.unwrap();

        assert!(inventory.inputs.is_empty());
        assert!(inventory.picks.iter().all(|p| p.strategy.is_none()));
    }
}
