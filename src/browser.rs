//! Headless Chromium session used to log in and capture Reitti day views.
//!
//! The browser process belongs to [`ChromeSession`] and is shut down when the session is
//! dropped, so every exit path (including early returns and panics) releases it.

use std::{ffi::OsStr, sync::Arc, thread, time::Duration};

use headless_chrome::{
    Browser, LaunchOptions, Tab, protocol::cdp::Page::CaptureScreenshotFormatOption,
};
use secrecy::ExposeSecret;
use url::Url;

use crate::{
    config::Credentials,
    foundation::error::{ReittiError, ReittiResult},
    screenshot::Readiness,
};

pub const USERNAME_SELECTOR: &str = "#username";
pub const PASSWORD_SELECTOR: &str = "#password";
pub const SUBMIT_SELECTOR: &str = "button[type='submit']";

const LOGIN_PATH_MARKER: &str = "/login";
const LOGIN_PAGE_MARKER: &str = "login-container";

// Long fixed waits must not trip the CDP idle watchdog.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Navigation and capture on a single page, one call at a time.
pub trait PageSession {
    fn open(&mut self, url: &Url) -> ReittiResult<()>;

    /// Block until the page counts as rendered.
    fn settle(&mut self, readiness: &Readiness) -> ReittiResult<()>;

    /// PNG of the current viewport.
    fn capture_png(&mut self) -> ReittiResult<Vec<u8>>;
}

/// `true` when the page after submitting the login form is still the login page.
pub fn login_rejected(current_url: &str, page_source: &str) -> bool {
    current_url.contains(LOGIN_PATH_MARKER) || page_source.contains(LOGIN_PAGE_MARKER)
}

pub struct ChromeSession {
    // Field order matters: the tab is dropped before the browser that owns it.
    tab: Arc<Tab>,
    _browser: Browser,
}

impl ChromeSession {
    pub fn launch(viewport: Viewport) -> ReittiResult<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((viewport.width, viewport.height)))
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(vec![
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
            ])
            .build()
            .map_err(|e| ReittiError::browser(format!("invalid launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| ReittiError::browser(format!("failed to launch chromium: {e}")))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ReittiError::browser(format!("failed to open tab: {e}")))?;

        Ok(Self {
            tab,
            _browser: browser,
        })
    }

    /// Submit the login form at `base_url`.
    ///
    /// Waits `settle` before filling the form and again after submitting. A page that still
    /// looks like the login page afterwards is an authentication failure.
    #[tracing::instrument(skip(self, credentials), fields(user = %credentials.username))]
    pub fn login(
        &mut self,
        base_url: &Url,
        credentials: &Credentials,
        settle: Duration,
    ) -> ReittiResult<()> {
        self.open(base_url)?;
        thread::sleep(settle);

        self.fill(USERNAME_SELECTOR, &credentials.username)?;
        self.fill(PASSWORD_SELECTOR, credentials.password.expose_secret())?;
        self.tab
            .find_element(SUBMIT_SELECTOR)
            .and_then(|button| button.click().map(|_| ()))
            .map_err(|e| ReittiError::authentication(format!("login button: {e}")))?;

        thread::sleep(settle);

        let url = self.tab.get_url();
        let content = self
            .tab
            .get_content()
            .map_err(|e| ReittiError::browser(format!("read page after login: {e}")))?;
        if login_rejected(&url, &content) {
            return Err(ReittiError::authentication(
                "still on login page, check username and password",
            ));
        }
        Ok(())
    }

    fn fill(&self, selector: &str, value: &str) -> ReittiResult<()> {
        let field = self
            .tab
            .find_element(selector)
            .map_err(|e| ReittiError::authentication(format!("login field {selector}: {e}")))?;
        field
            .call_js_fn("function() { this.value = ''; }", vec![], false)
            .and_then(|_| field.click().map(|_| ()))
            .and_then(|_| field.type_into(value).map(|_| ()))
            .map_err(|e| ReittiError::authentication(format!("fill {selector}: {e}")))
    }
}

impl PageSession for ChromeSession {
    fn open(&mut self, url: &Url) -> ReittiResult<()> {
        self.tab
            .navigate_to(url.as_str())
            .and_then(|tab| tab.wait_until_navigated().map(|_| ()))
            .map_err(|e| ReittiError::browser(format!("navigate to {url}: {e}")))
    }

    fn settle(&mut self, readiness: &Readiness) -> ReittiResult<()> {
        match readiness {
            Readiness::Fixed(wait) => {
                thread::sleep(*wait);
                Ok(())
            }
            Readiness::Selector { selector, timeout } => self
                .tab
                .wait_for_element_with_custom_timeout(selector, *timeout)
                .map(|_| ())
                .map_err(|e| ReittiError::browser(format!("waiting for '{selector}': {e}"))),
        }
    }

    fn capture_png(&mut self) -> ReittiResult<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| ReittiError::browser(format!("capture screenshot: {e}")))
    }
}
