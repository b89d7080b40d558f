//! Chrome session over the DevTools protocol
//!
//! The session is a scoped resource. `close` shuts the browser down on the
//! normal path; dropping the session on any other path stops the CDP handler
//! task and chromiumoxide kills the browser process.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::common::config::BrowserSettings;
use crate::common::{Error, Result};
use crate::scenario::Locator;
use crate::source::Driver;

/// Executables tried on PATH when none is configured
const CHROME_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Find a Chrome executable on PATH
pub fn find_chrome() -> Option<PathBuf> {
    CHROME_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Check that the application under test answers before driving it
pub async fn preflight(base_url: &str) -> Result<()> {
    let unreachable = |error: String| Error::TargetUnreachable {
        url: base_url.to_string(),
        error,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| unreachable(e.to_string()))?;

    let response = client
        .get(base_url)
        .send()
        .await
        .map_err(|e| unreachable(e.to_string()))?;

    tracing::debug!(status = %response.status(), url = base_url, "Preflight response");

    if response.status().is_server_error() {
        return Err(unreachable(format!("server answered {}", response.status())));
    }
    Ok(())
}

/// A running browser with one page that all scenarios share
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch the browser and open a blank page
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .launch_timeout(settings.launch_timeout())
            .args(settings.args.iter().map(String::as_str));

        if !settings.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = settings.executable.clone().or_else(find_chrome) {
            tracing::debug!(path = %executable.display(), "Using browser executable");
            builder = builder.chrome_executable(executable);
        }

        let config = builder.build().map_err(Error::DriverInit)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::DriverInit(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(Error::DriverInit(e.to_string()));
            }
        };

        tracing::info!(headless = settings.headless, "Browser session started");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Shut the browser down and wait for the process to exit
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        tracing::info!("Browser session closed");
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Evaluate a script and deserialize its result
///
/// Scripts must not evaluate to `null`; CDP reports that as a missing value.
async fn eval<T: serde::de::DeserializeOwned>(page: &Page, script: String) -> Result<T> {
    let value = page.evaluate(script).await?;
    value
        .into_value()
        .map_err(|e| Error::Browser(format!("unexpected script result: {}", e)))
}

/// Script expression resolving a locator to an element or `null`
fn locate_script(locator: &Locator) -> String {
    // serde_json string encoding is a valid JS string literal
    let quote = |s: &str| serde_json::Value::from(s).to_string();

    match locator {
        Locator::Button(text) => format!(
            "Array.from(document.querySelectorAll('button')).find(b => (b.textContent || '').includes({})) || null",
            quote(text)
        ),
        Locator::Text(text) => format!(
            "(() => {{ if (!document.body) return null; \
             const w = document.createTreeWalker(document.body, NodeFilter.SHOW_TEXT); \
             while (w.nextNode()) {{ if (w.currentNode.nodeValue.includes({})) return w.currentNode.parentElement; }} \
             return null; }})()",
            quote(text)
        ),
        other => format!(
            "document.querySelector({})",
            quote(&other.css_selector().unwrap_or_default())
        ),
    }
}

#[async_trait]
impl Driver for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        tracing::debug!(url, "Navigating");
        self.page.goto(url).await?;
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        self.page.reload().await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn is_present(&mut self, locator: &Locator) -> Result<bool> {
        eval(&self.page, format!("({}) !== null", locate_script(locator))).await
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        if let Some(selector) = locator.css_selector() {
            self.page.find_element(selector).await?.click().await?;
            return Ok(());
        }

        let clicked: bool = eval(
            &self.page,
            format!(
                "(() => {{ const el = {}; if (!el) return false; el.click(); return true; }})()",
                locate_script(locator)
            ),
        )
        .await?;

        if clicked {
            Ok(())
        } else {
            Err(Error::ElementNotFound(locator.to_string()))
        }
    }

    async fn type_text(&mut self, locator: &Locator, text: &str) -> Result<()> {
        let selector = locator
            .css_selector()
            .ok_or_else(|| Error::InvalidStep(format!("cannot type into {}", locator)))?;

        self.page
            .find_element(selector)
            .await?
            .click()
            .await?
            .type_str(text)
            .await?;
        Ok(())
    }

    async fn value(&mut self, locator: &Locator) -> Result<Option<String>> {
        let found: Vec<String> = eval(
            &self.page,
            format!(
                "(() => {{ const el = {}; return el && typeof el.value === 'string' ? [el.value] : []; }})()",
                locate_script(locator)
            ),
        )
        .await?;
        Ok(found.into_iter().next())
    }
}
