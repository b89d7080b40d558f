//! Browser script types
//!
//! Defines the scripted interactions an automated scenario performs,
//! deserialized from the scenario catalog.

use serde::Deserialize;
use std::fmt;

/// How to find an element on the page
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// Raw CSS selector
    Css(String),
    /// `<input>` with this exact placeholder
    Placeholder(String),
    /// `<button>` whose text contains this string
    Button(String),
    /// Any element with a text node containing this string
    Text(String),
}

impl Locator {
    /// CSS selector for locators that have one
    ///
    /// Text-based locators return `None` and are resolved by script.
    pub fn css_selector(&self) -> Option<String> {
        match self {
            Locator::Css(selector) => Some(selector.clone()),
            Locator::Placeholder(placeholder) => Some(format!(
                "input[placeholder=\"{}\"]",
                placeholder.replace('\\', "\\\\").replace('"', "\\\"")
            )),
            Locator::Button(_) | Locator::Text(_) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "element '{}'", s),
            Locator::Placeholder(s) => write!(f, "input with placeholder '{}'", s),
            Locator::Button(s) => write!(f, "button '{}'", s),
            Locator::Text(s) => write!(f, "text '{}'", s),
        }
    }
}

/// A single scripted interaction
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Load a page relative to the base URL
    Navigate {
        /// Path appended to the base URL (empty = base URL itself)
        #[serde(default)]
        path: String,
    },
    /// Reload the current page
    Refresh,
    /// Wait for an element, then click it
    Click { target: Locator },
    /// Wait for an input, then type into it
    Type { target: Locator, text: String },
    /// Wait until an element is present
    WaitVisible { target: Locator },
    /// Wait until an element is gone
    AssertAbsent { target: Locator },
    /// Wait until an input holds exactly this value
    AssertValue { target: Locator, value: String },
    /// Wait until the current URL matches
    AssertUrl {
        #[serde(default)]
        contains: Option<String>,
        #[serde(default)]
        not_contains: Option<String>,
        /// Exact path, ignoring scheme, host, query and fragment
        #[serde(default)]
        path: Option<String>,
    },
    /// Wait until at least `at_least` of the texts are on the page
    AssertTextCount { texts: Vec<String>, at_least: usize },
    /// Sleep for a fixed time
    Pause { millis: u64 },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Navigate { path } if path.is_empty() => write!(f, "navigate to base URL"),
            Step::Navigate { path } => write!(f, "navigate to {}", path),
            Step::Refresh => write!(f, "refresh"),
            Step::Click { target } => write!(f, "click {}", target),
            Step::Type { target, .. } => write!(f, "type into {}", target),
            Step::WaitVisible { target } => write!(f, "wait for {}", target),
            Step::AssertAbsent { target } => write!(f, "assert {} absent", target),
            Step::AssertValue { target, value } => {
                write!(f, "assert {} has value '{}'", target, value)
            }
            Step::AssertUrl { .. } => write!(f, "assert url"),
            Step::AssertTextCount { texts, at_least } => {
                write!(f, "assert {}/{} texts present", at_least, texts.len())
            }
            Step::Pause { millis } => write!(f, "pause {}ms", millis),
        }
    }
}
