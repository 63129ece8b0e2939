//! In-memory page model
//!
//! A [`FakeSite`] maps URLs to flat lists of elements in document order and
//! decides where a form submission lands. [`FakeSession`] evaluates the same
//! [`Locator`] strategies the WebDriver adapter sends to a real browser, so
//! the engine and runner can be exercised without a WebDriver server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{BrowserKind, BrowserSession, Locator, PageElement, SessionFactory, SessionProfile};
use crate::common::{Error, Result};

/// One element of a fake page
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    /// An `input` of the given type
    pub fn input(kind: &str) -> Self {
        Self::new("input").attr("type", kind)
    }

    pub fn button(text: &str) -> Self {
        Self::new("button").text(text)
    }

    pub fn label(text: &str) -> Self {
        Self::new("label").text(text)
    }

    pub fn link(text: &str, href: &str) -> Self {
        Self::new("a").text(text).attr("href", href)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    fn is_submit(&self) -> bool {
        (self.is("button") && self.get("type").map_or(true, |t| t == "submit"))
            || (self.is("input") && self.get("type") == Some("submit"))
    }

    /// Identifier used in interaction logs: name, then id, then tag
    pub fn key(&self) -> String {
        self.get("name")
            .or_else(|| self.get("id"))
            .map(str::to_string)
            .unwrap_or_else(|| self.tag.clone())
    }

    fn render(&self) -> String {
        let attrs: String = self
            .attrs
            .iter()
            .map(|(k, v)| format!(" {k}=\"{v}\""))
            .collect();
        if self.is("input") {
            format!("<{}{}>", self.tag, attrs)
        } else {
            format!("<{tag}{attrs}>{}</{tag}>", self.text, tag = self.tag)
        }
    }
}

/// A fake document
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub elements: Vec<FakeElement>,
    /// Free text rendered after the elements
    pub body: String,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn body(mut self, text: &str) -> Self {
        self.body = text.to_string();
        self
    }

    /// A conventional login form with name-attributed fields
    pub fn login_form() -> Self {
        Self::new()
            .with(FakeElement::input("text").attr("name", "username"))
            .with(FakeElement::input("password").attr("name", "password"))
            .with(FakeElement::button("Login").attr("type", "submit"))
    }

    pub fn source(&self) -> String {
        let elements: String = self.elements.iter().map(FakeElement::render).collect();
        format!("<html><body>{}{}</body></html>", elements, self.body)
    }

    /// Indices of elements matching `locator`, in document order
    pub fn select(&self, locator: &Locator) -> Vec<usize> {
        if let Locator::LabelledInput(keywords) = locator {
            return self.labelled_inputs(keywords);
        }
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element_matches(element, locator))
            .map(|(index, _)| index)
            .collect()
    }

    fn labelled_inputs(&self, keywords: &[&str]) -> Vec<usize> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for (index, element) in self.elements.iter().enumerate() {
            if !element.is("label") || !contains_any_lowered(&element.text, keywords) {
                continue;
            }
            let next = self.elements[index + 1..]
                .iter()
                .position(|e| e.is("input"))
                .map(|offset| index + 1 + offset);
            if let Some(input) = next {
                if seen.insert(input) {
                    found.push(input);
                }
            }
        }
        found.sort_unstable();
        found
    }
}

fn contains_any_lowered(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|k| text.contains(&k.to_lowercase()))
}

fn element_matches(element: &FakeElement, locator: &Locator) -> bool {
    let input = element.is("input");
    match locator {
        Locator::Name(value) => element.get("name") == Some(value.as_str()),
        Locator::Id(value) => element.get("id") == Some(value.as_str()),
        Locator::NameOrId(value) => {
            input
                && (element.get("name") == Some(value.as_str())
                    || element.get("id") == Some(value.as_str()))
        }
        Locator::Placeholder(value) => input && element.get("placeholder") == Some(value.as_str()),
        Locator::TextLikeInput => {
            input
                && (matches!(element.get("type"), Some("text") | Some("email"))
                    || ["username", "email"]
                        .iter()
                        .any(|v| element.get("name") == Some(*v) || element.get("id") == Some(*v)))
        }
        Locator::InputType(kind) => input && element.get("type") == Some(kind.as_str()),
        Locator::LabelledInput(_) => false,
        Locator::ButtonText(value) => {
            element.is("button") && contains_any_lowered(&element.text, &[value.as_str()])
        }
        Locator::InputValue(value) => {
            input
                && element.get("value").is_some_and(|v| {
                    v == value.as_str() || v.to_lowercase().contains(&value.to_lowercase())
                })
        }
        Locator::SubmitControl(tag) => element.is(tag) && element.get("type") == Some("submit"),
        Locator::ButtonKeywords(keywords) => {
            element.is("button") && contains_any_lowered(&element.text, keywords)
        }
        Locator::InputValueKeywords(values) => {
            input
                && element
                    .get("value")
                    .is_some_and(|v| values.iter().any(|candidate| *candidate == v))
        }
        Locator::LogoutControl => {
            (element.is("a") || element.is("button"))
                && (element.text.contains("Logout") || element.text.contains("Log out"))
        }
        Locator::AnyInput => input,
    }
}

/// Values typed into the form at the moment of submission, keyed by field key
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub url: String,
    pub values: BTreeMap<String, String>,
}

impl FormSubmission {
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

type SubmitHandler = dyn Fn(&FormSubmission) -> String + Send + Sync;

/// A set of fake pages plus the behaviour of form submission
#[derive(Clone, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
    on_submit: Option<Arc<SubmitHandler>>,
    broken_navigation: HashSet<String>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Decide the URL a submitted form lands on
    pub fn on_submit<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FormSubmission) -> String + Send + Sync + 'static,
    {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    /// Make navigation to `url` fail like an unreachable host
    pub fn unreachable(mut self, url: &str) -> Self {
        self.broken_navigation.insert(url.to_string());
        self
    }
}

struct State {
    site: FakeSite,
    url: String,
    page: FakePage,
    /// Bumped on every navigation; handles from older documents go stale
    generation: u64,
    values: HashMap<usize, String>,
    navigations: Vec<String>,
    typed: Vec<(String, String)>,
    clicked: Vec<String>,
    broken_locators: Vec<Locator>,
    quit: bool,
}

impl State {
    fn load(&mut self, url: &str) -> Result<()> {
        if self.quit {
            return Err(Error::webdriver("invalid session id"));
        }
        if self.site.broken_navigation.contains(url) {
            return Err(Error::navigation(url, "net::ERR_NAME_NOT_RESOLVED"));
        }
        self.url = url.to_string();
        self.page = self.site.pages.get(url).cloned().unwrap_or_default();
        self.generation += 1;
        self.values.clear();
        self.navigations.push(url.to_string());
        Ok(())
    }

    fn submission(&self) -> FormSubmission {
        let values = self
            .values
            .iter()
            .filter_map(|(index, value)| {
                self.page
                    .elements
                    .get(*index)
                    .map(|element| (element.key(), value.clone()))
            })
            .collect();
        FormSubmission {
            url: self.url.clone(),
            values,
        }
    }
}

/// An in-memory browser session over a [`FakeSite`]
///
/// Clones share state, so a test can keep a handle for inspection after the
/// runner has consumed its copy.
#[derive(Clone)]
pub struct FakeSession {
    state: Arc<Mutex<State>>,
}

impl FakeSession {
    /// A session on `about:blank`
    pub fn new(site: FakeSite) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                site,
                url: "about:blank".to_string(),
                page: FakePage::default(),
                generation: 0,
                values: HashMap::new(),
                navigations: Vec::new(),
                typed: Vec::new(),
                clicked: Vec::new(),
                broken_locators: Vec::new(),
                quit: false,
            })),
        }
    }

    /// A session already showing `url`
    pub fn at(site: FakeSite, url: &str) -> Self {
        let session = Self::new(site);
        {
            let mut state = session.lock();
            let page = state.site.pages.get(url).cloned().unwrap_or_default();
            state.url = url.to_string();
            state.page = page;
        }
        session
    }

    /// Make every lookup with `locator` fail with a driver error
    pub fn break_locator(&self, locator: Locator) {
        self.lock().broken_locators.push(locator);
    }

    /// URLs navigated to, in order
    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    /// `(field key, text)` pairs passed to `send_keys`, in order
    pub fn typed(&self) -> Vec<(String, String)> {
        self.lock().typed.clone()
    }

    /// Keys of clicked elements, in order
    pub fn clicked(&self) -> Vec<String> {
        self.lock().clicked.clone()
    }

    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    pub fn is_quit(&self) -> bool {
        self.lock().quit
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-update
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Element = FakeHandle;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.lock().load(url)
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.lock();
        if state.quit {
            return Err(Error::webdriver("invalid session id"));
        }
        Ok(state.url.clone())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.lock().page.source())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<FakeHandle>> {
        let state = self.lock();
        if state.broken_locators.contains(locator) {
            return Err(Error::webdriver(format!("no such element: {locator}")));
        }
        Ok(state
            .page
            .select(locator)
            .into_iter()
            .map(|index| FakeHandle {
                state: Arc::clone(&self.state),
                generation: state.generation,
                index,
            })
            .collect())
    }

    async fn quit(self) -> Result<()> {
        self.lock().quit = true;
        Ok(())
    }
}

/// Element handle into a [`FakeSession`]
pub struct FakeHandle {
    state: Arc<Mutex<State>>,
    generation: u64,
    index: usize,
}

impl FakeHandle {
    fn with_element<T>(&self, f: impl FnOnce(&mut State, FakeElement) -> T) -> Result<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.generation != self.generation {
            return Err(Error::webdriver("stale element reference"));
        }
        let element = state
            .page
            .elements
            .get(self.index)
            .cloned()
            .ok_or_else(|| Error::webdriver("stale element reference"))?;
        Ok(f(&mut state, element))
    }
}

#[async_trait]
impl PageElement for FakeHandle {
    async fn clear(&self) -> Result<()> {
        let index = self.index;
        self.with_element(|state, _| {
            state.values.remove(&index);
        })
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        let index = self.index;
        self.with_element(|state, element| {
            state.values.entry(index).or_default().push_str(text);
            state.typed.push((element.key(), text.to_string()));
        })
    }

    async fn click(&self) -> Result<()> {
        let target = self.with_element(|state, element| {
            state.clicked.push(element.key());
            if element.is("a") {
                element.get("href").map(str::to_string)
            } else if element.is_submit() {
                let submission = state.submission();
                state.site.on_submit.clone().map(|handler| handler(&submission))
            } else {
                None
            }
        })?;

        match target {
            Some(url) => self.state.lock().unwrap_or_else(|e| e.into_inner()).load(&url),
            None => Ok(()),
        }
    }

    async fn text(&self) -> Result<String> {
        self.with_element(|_, element| element.text)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        let index = self.index;
        self.with_element(|state, element| {
            if name == "value" {
                if let Some(typed) = state.values.get(&index) {
                    return Some(typed.clone());
                }
            }
            element.get(name).map(str::to_string)
        })
    }

    async fn is_displayed(&self) -> Result<bool> {
        self.with_element(|_, element| !element.attrs.contains_key("hidden"))
    }
}

/// Hands out [`FakeSession`]s, optionally refusing some browsers
#[derive(Default)]
pub struct FakeFactory {
    site: FakeSite,
    refuse_standard: HashSet<BrowserKind>,
    refuse_all: HashSet<BrowserKind>,
    provisioned: Mutex<Vec<(BrowserKind, SessionProfile, FakeSession)>>,
}

impl FakeFactory {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            ..Default::default()
        }
    }

    /// Fail the standard profile for `browser`; the minimal profile still works
    pub fn refuse_standard(mut self, browser: BrowserKind) -> Self {
        self.refuse_standard.insert(browser);
        self
    }

    /// Fail every attempt to start `browser`
    pub fn refuse(mut self, browser: BrowserKind) -> Self {
        self.refuse_all.insert(browser);
        self
    }

    /// Every session handed out so far, with the browser and profile used
    pub fn provisioned(&self) -> Vec<(BrowserKind, SessionProfile, FakeSession)> {
        self.provisioned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakeSession;

    async fn provision(&self, browser: BrowserKind, profile: SessionProfile) -> Result<FakeSession> {
        let refused = self.refuse_all.contains(&browser)
            || (profile == SessionProfile::Standard && self.refuse_standard.contains(&browser));
        if refused {
            return Err(Error::session_provision(browser, "session not created"));
        }

        let session = FakeSession::new(self.site.clone());
        self.provisioned
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((browser, profile, session.clone()));
        Ok(session)
    }
}
