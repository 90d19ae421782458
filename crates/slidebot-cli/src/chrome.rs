//! Headless Chrome implementation of the page driver.

use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::de::DeserializeOwned;
use slidebot_core::{DriverError, DriverResult, Extractor, PageDriver};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// How the browser is started and the game page opened
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub executable: PathBuf,
    pub headless: bool,
    pub viewport: (u32, u32),
    pub navigation_timeout: Duration,
    /// Pause after navigation so the game can boot
    pub initial_wait: Duration,
}

impl LaunchSettings {
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            headless: true,
            viewport: (500, 700),
            navigation_timeout: Duration::from_secs(30),
            initial_wait: Duration::from_millis(1000),
        }
    }
}

/// A game page in a browser owned by this handle
pub struct ChromePage {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromePage {
    /// Start the browser and load `url`
    pub fn launch(settings: &LaunchSettings, url: &str) -> DriverResult<Self> {
        let options = LaunchOptions::default_builder()
            .path(Some(settings.executable.clone()))
            .headless(settings.headless)
            .sandbox(false)
            .window_size(Some(settings.viewport))
            .idle_browser_timeout(Duration::from_secs(10 * 60))
            .build()
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| DriverError::Launch(e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        info!(url, "navigating");
        tab.set_default_timeout(settings.navigation_timeout);
        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        std::thread::sleep(settings.initial_wait);

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    /// Run a script that returns a JSON string and decode it
    fn evaluate<T: DeserializeOwned>(&self, selector: &str, script: &str) -> DriverResult<T> {
        let query_failed = |reason: String| DriverError::Query {
            selector: selector.to_string(),
            reason,
        };

        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| query_failed(e.to_string()))?;
        let json = match result.value {
            Some(serde_json::Value::String(json)) => json,
            other => return Err(query_failed(format!("unexpected result {:?}", other))),
        };
        serde_json::from_str(&json).map_err(|e| query_failed(e.to_string()))
    }
}

/// Selector as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn text_script(selector: &str) -> String {
    format!(
        "(() => {{ const el = document.querySelector({}); return JSON.stringify(el ? el.innerText : null); }})()",
        js_string(selector)
    )
}

fn count_script(selector: &str) -> String {
    format!(
        "JSON.stringify(document.querySelectorAll({}).length)",
        js_string(selector)
    )
}

fn all_script(selector: &str, extractor: &Extractor) -> String {
    let extract = match extractor {
        Extractor::ClassName => "e.getAttribute('class') || ''".to_string(),
        Extractor::InnerText => "e.innerText || ''".to_string(),
        Extractor::Attribute(name) => format!("e.getAttribute({}) || ''", js_string(name)),
    };
    format!(
        "JSON.stringify(Array.from(document.querySelectorAll({}), e => {}))",
        js_string(selector),
        extract
    )
}

impl PageDriver for ChromePage {
    fn send_key(&mut self, key: &str) -> DriverResult<()> {
        self.tab
            .press_key(key)
            .map(|_| ())
            .map_err(|e| DriverError::Input {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn screenshot(&mut self) -> DriverResult<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| DriverError::Screenshot(e.to_string()))
    }

    fn query_text(&mut self, selector: &str) -> DriverResult<String> {
        let text: Option<String> = self.evaluate(selector, &text_script(selector))?;
        text.ok_or_else(|| DriverError::Query {
            selector: selector.to_string(),
            reason: "no matching element".to_string(),
        })
    }

    fn query_count(&mut self, selector: &str) -> DriverResult<usize> {
        self.evaluate(selector, &count_script(selector))
    }

    fn query_all(&mut self, selector: &str, extractor: Extractor) -> DriverResult<Vec<String>> {
        self.evaluate(selector, &all_script(selector, &extractor))
    }

    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn close(&mut self) -> DriverResult<()> {
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };
        debug!("closing browser");
        let closed = self.tab.close(true);
        drop(browser);
        closed
            .map(|_| ())
            .map_err(|e| DriverError::Close(e.to_string()))
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
