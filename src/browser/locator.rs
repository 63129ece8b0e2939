//! Semantic locators and their CSS/XPath translation
//!
//! A [`Locator`] says *what* to look for ("an input whose placeholder is X");
//! [`Locator::selector`] says how a WebDriver server finds it. Keeping the two
//! apart lets the fake page model evaluate the same strategies without a
//! selector engine.

use std::fmt;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// A single element lookup strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// Any element whose `name` attribute equals the value
    Name(String),
    /// Any element whose `id` attribute equals the value
    Id(String),
    /// An `input` whose `name` or `id` equals the value
    NameOrId(String),
    /// An `input` whose `placeholder` equals the value
    Placeholder(String),
    /// A text or email `input`, or one named/identified as username or email
    TextLikeInput,
    /// An `input` of the given `type`
    InputType(String),
    /// The first `input` following a `label` whose text contains a keyword
    LabelledInput(&'static [&'static str]),
    /// A `button` whose text contains the value, ignoring case
    ButtonText(String),
    /// An `input` whose value equals, or contains ignoring case, the value
    InputValue(String),
    /// A control of the given tag with `type="submit"`
    SubmitControl(&'static str),
    /// A `button` whose text contains any keyword, ignoring case
    ButtonKeywords(&'static [&'static str]),
    /// An `input` whose value is exactly one of the given values
    InputValueKeywords(&'static [&'static str]),
    /// A link or button labelled "Logout" or "Log out"
    LogoutControl,
    /// Every `input` on the page
    AnyInput,
}

/// Concrete selector understood by WebDriver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Locator {
    /// Translate into a WebDriver selector
    pub fn selector(&self) -> Selector {
        match self {
            Self::Name(value) => Selector::Css(format!("[name={}]", css_string(value))),
            Self::Id(value) => Selector::Css(format!("[id={}]", css_string(value))),
            Self::NameOrId(value) => {
                let quoted = css_string(value);
                Selector::Css(format!("input[name={quoted}], input[id={quoted}]"))
            }
            Self::Placeholder(value) => {
                Selector::XPath(format!("//input[@placeholder={}]", xpath_literal(value)))
            }
            Self::TextLikeInput => Selector::XPath(
                "//input[@type='text' or @type='email' or @name='username' or @id='username' \
                 or @name='email' or @id='email']"
                    .to_string(),
            ),
            Self::InputType(kind) => {
                Selector::XPath(format!("//input[@type={}]", xpath_literal(kind)))
            }
            Self::LabelledInput(keywords) => Selector::XPath(format!(
                "//label[{}]/following::input[1]",
                any_contains_lowered(".", keywords)
            )),
            Self::ButtonText(value) => Selector::XPath(format!(
                "//button[contains({}, {})]",
                lowered("."),
                xpath_literal(&value.to_lowercase())
            )),
            Self::InputValue(value) => Selector::XPath(format!(
                "//input[@value={} or contains({}, {})]",
                xpath_literal(value),
                lowered("@value"),
                xpath_literal(&value.to_lowercase())
            )),
            Self::SubmitControl(tag) => Selector::Css(format!("{tag}[type=\"submit\"]")),
            Self::ButtonKeywords(keywords) => {
                Selector::XPath(format!("//button[{}]", any_contains_lowered(".", keywords)))
            }
            Self::InputValueKeywords(values) => {
                let alternatives: Vec<String> = values
                    .iter()
                    .map(|v| format!("@value={}", xpath_literal(v)))
                    .collect();
                Selector::XPath(format!("//input[{}]", alternatives.join(" or ")))
            }
            Self::LogoutControl => Selector::XPath(
                "//a[contains(., 'Logout') or contains(., 'Log out')] \
                 | //button[contains(., 'Logout') or contains(., 'Log out')]"
                    .to_string(),
            ),
            Self::AnyInput => Selector::Css("input".to_string()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(v) => write!(f, "name={v}"),
            Self::Id(v) => write!(f, "id={v}"),
            Self::NameOrId(v) => write!(f, "input name-or-id={v}"),
            Self::Placeholder(v) => write!(f, "placeholder={v}"),
            Self::TextLikeInput => write!(f, "text-like input"),
            Self::InputType(t) => write!(f, "input type={t}"),
            Self::LabelledInput(k) => write!(f, "input after label {k:?}"),
            Self::ButtonText(v) => write!(f, "button text~{v}"),
            Self::InputValue(v) => write!(f, "input value~{v}"),
            Self::SubmitControl(tag) => write!(f, "{tag} type=submit"),
            Self::ButtonKeywords(k) => write!(f, "button text~{k:?}"),
            Self::InputValueKeywords(k) => write!(f, "input value in {k:?}"),
            Self::LogoutControl => write!(f, "logout control"),
            Self::AnyInput => write!(f, "any input"),
        }
    }
}

/// Quote a value for use inside a CSS attribute selector
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\a "),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Quote a value as an XPath 1.0 string literal
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn lowered(expr: &str) -> String {
    format!("translate({expr}, '{UPPER}', '{LOWER}')")
}

fn any_contains_lowered(expr: &str, keywords: &[&str]) -> String {
    keywords
        .iter()
        .map(|k| format!("contains({}, {})", lowered(expr), xpath_literal(&k.to_lowercase())))
        .collect::<Vec<_>>()
        .join(" or ")
}
