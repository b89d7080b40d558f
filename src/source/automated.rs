//! Browser-driven evaluation
//!
//! Executes a scenario's script step by step against a [`Driver`]. Every
//! condition is polled until it holds or the wait bound runs out. Nothing
//! escapes a scenario: unmet conditions become `Failed`, driver trouble
//! becomes `Errored`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout, Instant};

use crate::common::config::BrowserSettings;
use crate::common::{Error, Result};
use crate::scenario::{Locator, Outcome, Scenario, Step};

use super::InteractionSource;

/// Browser operations needed by scripted scenarios
#[async_trait]
pub trait Driver: Send {
    /// Load a URL and wait for the load to finish
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Reload the current page
    async fn refresh(&mut self) -> Result<()>;

    /// URL of the current page
    async fn current_url(&mut self) -> Result<String>;

    /// Whether the element exists right now
    async fn is_present(&mut self, locator: &Locator) -> Result<bool>;

    /// Click an element
    async fn click(&mut self, locator: &Locator) -> Result<()>;

    /// Type text into an input
    async fn type_text(&mut self, locator: &Locator, text: &str) -> Result<()>;

    /// Current `value` of an input, `None` if there is no such element
    async fn value(&mut self, locator: &Locator) -> Result<Option<String>>;
}

/// Bounded wait used for every DOM condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl From<&BrowserSettings> for WaitPolicy {
    fn from(settings: &BrowserSettings) -> Self {
        Self {
            timeout: settings.wait_timeout(),
            poll_interval: settings.poll_interval(),
        }
    }
}

/// Something to wait for on the page
enum Condition<'a> {
    Present(&'a Locator),
    Absent(&'a Locator),
    Value(&'a Locator, &'a str),
    Url {
        contains: Option<&'a str>,
        not_contains: Option<&'a str>,
        path: Option<&'a str>,
    },
    TextCount(&'a [String], usize),
}

impl fmt::Display for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present(l) => write!(f, "{}", l),
            Condition::Absent(l) => write!(f, "{} to disappear", l),
            Condition::Value(l, v) => write!(f, "{} to have value '{}'", l, v),
            Condition::Url {
                contains,
                not_contains,
                path,
            } => {
                write!(f, "url")?;
                if let Some(p) = path {
                    write!(f, " with path '{}'", p)?;
                }
                if let Some(c) = contains {
                    write!(f, " containing '{}'", c)?;
                }
                if let Some(c) = not_contains {
                    write!(f, " not containing '{}'", c)?;
                }
                Ok(())
            }
            Condition::TextCount(texts, at_least) => {
                write!(f, "{} of {} texts", at_least, texts.len())
            }
        }
    }
}

/// Path component of an absolute URL, `None` if it does not parse
fn url_path(url: &str) -> Option<String> {
    reqwest::Url::parse(url).ok().map(|u| u.path().to_string())
}

/// Run one driver call under the wait bound
async fn bounded<T>(
    limit: Duration,
    what: impl fmt::Display,
    call: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::wait_timeout(what, limit)),
    }
}

/// Interaction source that drives a browser
pub struct AutomatedSource<D> {
    driver: D,
    base_url: String,
    wait: WaitPolicy,
}

impl<D: Driver> AutomatedSource<D> {
    pub fn new(driver: D, base_url: impl Into<String>, wait: WaitPolicy) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            wait,
        }
    }

    /// Give the driver back, e.g. to close the browser
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Resolve a script path against the base URL
    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    async fn execute_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Navigate { path } => {
                let url = self.url_for(path);
                let limit = self.wait.timeout;
                bounded(limit, format!("page load of {}", url), self.driver.navigate(&url)).await
            }
            Step::Refresh => {
                bounded(self.wait.timeout, "page reload", self.driver.refresh()).await
            }
            Step::Click { target } => {
                self.wait_for(&Condition::Present(target)).await?;
                let limit = self.wait.timeout;
                bounded(limit, format!("click on {}", target), self.driver.click(target)).await
            }
            Step::Type { target, text } => {
                if target.css_selector().is_none() {
                    return Err(Error::InvalidStep(format!("cannot type into {}", target)));
                }
                self.wait_for(&Condition::Present(target)).await?;
                let limit = self.wait.timeout;
                bounded(limit, format!("typing into {}", target), self.driver.type_text(target, text))
                    .await
            }
            Step::WaitVisible { target } => self.wait_for(&Condition::Present(target)).await,
            Step::AssertAbsent { target } => self.wait_for(&Condition::Absent(target)).await,
            Step::AssertValue { target, value } => {
                self.wait_for(&Condition::Value(target, value)).await
            }
            Step::AssertUrl {
                contains,
                not_contains,
                path,
            } => {
                if contains.is_none() && not_contains.is_none() && path.is_none() {
                    return Err(Error::InvalidStep(
                        "assert_url needs 'contains', 'not_contains' or 'path'".to_string(),
                    ));
                }
                self.wait_for(&Condition::Url {
                    contains: contains.as_deref(),
                    not_contains: not_contains.as_deref(),
                    path: path.as_deref(),
                })
                .await
            }
            Step::AssertTextCount { texts, at_least } => {
                if *at_least > texts.len() {
                    return Err(Error::InvalidStep(format!(
                        "assert_text_count wants {} of only {} texts",
                        at_least,
                        texts.len()
                    )));
                }
                self.wait_for(&Condition::TextCount(texts, *at_least)).await
            }
            Step::Pause { millis } => {
                sleep(Duration::from_millis(*millis)).await;
                Ok(())
            }
        }
    }

    /// Check a condition once
    async fn check(&mut self, condition: &Condition<'_>) -> Result<bool> {
        match condition {
            Condition::Present(locator) => self.driver.is_present(locator).await,
            Condition::Absent(locator) => Ok(!self.driver.is_present(locator).await?),
            Condition::Value(locator, expected) => {
                Ok(self.driver.value(locator).await?.as_deref() == Some(*expected))
            }
            Condition::Url {
                contains,
                not_contains,
                path,
            } => {
                let url = self.driver.current_url().await?;
                Ok(contains.map_or(true, |c| url.contains(c))
                    && not_contains.map_or(true, |c| !url.contains(c))
                    && path.map_or(true, |p| url_path(&url).as_deref() == Some(p)))
            }
            Condition::TextCount(texts, at_least) => {
                let mut found = 0;
                for text in texts.iter() {
                    if self.driver.is_present(&Locator::Text(text.clone())).await? {
                        found += 1;
                    }
                }
                tracing::debug!(found, total = texts.len(), "Counted texts");
                Ok(found >= *at_least)
            }
        }
    }

    /// Poll a condition until it holds or the wait bound expires
    ///
    /// Each check is itself cut off at the deadline, so a hung driver call
    /// cannot stretch the wait. Driver errors during polling are retried; if
    /// the last poll before the deadline still errors, that error is returned
    /// instead of a timeout.
    async fn wait_for(&mut self, condition: &Condition<'_>) -> Result<()> {
        let deadline = Instant::now() + self.wait.timeout;
        let mut last_error = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(last_error
                    .unwrap_or_else(|| Error::wait_timeout(condition, self.wait.timeout)));
            }

            match timeout(remaining, self.check(condition)).await {
                Ok(Ok(true)) => return Ok(()),
                Ok(Ok(false)) => last_error = None,
                Ok(Err(e)) => {
                    tracing::debug!(condition = %condition, error = %e, "Condition check failed");
                    last_error = Some(e);
                }
                Err(_) => {
                    tracing::debug!(condition = %condition, "Condition check outlived the wait");
                    return Err(Error::wait_timeout(condition, self.wait.timeout));
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(self.wait.poll_interval.min(remaining)).await;
        }
    }
}

#[async_trait]
impl<D: Driver> InteractionSource for AutomatedSource<D> {
    async fn evaluate(&mut self, scenario: &Scenario) -> Result<Outcome> {
        if scenario.steps.is_empty() {
            return Ok(Outcome::Errored("no automation script".to_string()));
        }

        for (i, step) in scenario.steps.iter().enumerate() {
            let step_num = i + 1;
            tracing::debug!(id = %scenario.id, step = step_num, action = %step, "Executing step");

            if let Err(e) = self.execute_step(step).await {
                let reason = format!("step {} ({}): {}", step_num, step, e);
                tracing::info!(id = %scenario.id, %reason, "Scenario did not pass");
                return Ok(if e.is_assertion() {
                    Outcome::Failed(reason)
                } else {
                    Outcome::Errored(reason)
                });
            }
        }

        Ok(Outcome::Passed)
    }
}
