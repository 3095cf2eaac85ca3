//! Run settings for both programs.
//!
//! Settings are read once at startup from the process environment (through the `config`
//! crate's `Environment` source, keys lowercased) and passed down by reference. Nothing below
//! this module looks at the environment.

use std::{path::PathBuf, time::Duration};

use chrono::{Datelike, NaiveDate};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::{
    browser::Viewport,
    foundation::{
        core::{MonthDay, YearRange, parse_date},
        error::{ReittiError, ReittiResult},
    },
    screenshot::Readiness,
};

pub const DEFAULT_START_YEAR: i32 = 2012;
pub const DEFAULT_MIN_EXPORT_BYTES: u64 = 1000;
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

fn default_overlay_url() -> String {
    "http://192.168.79.2:8030".to_string()
}
fn default_collage_url() -> String {
    "http://192.168.79.2:8030/".to_string()
}
fn default_start_year() -> i32 {
    DEFAULT_START_YEAR
}
fn default_min_export_bytes() -> u64 {
    DEFAULT_MIN_EXPORT_BYTES
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("/output")
}
fn default_wait_time() -> u64 {
    5
}
fn default_login_wait_time() -> u64 {
    3
}
fn default_width() -> u32 {
    1920
}
fn default_height() -> u32 {
    1080
}
fn default_columns() -> u32 {
    3
}
fn default_true() -> bool {
    true
}

/// Build the raw key/value layer: process environment plus explicit overrides (CLI flags).
pub fn env_config(overrides: &[(&str, String)]) -> ReittiResult<config::Config> {
    let mut builder = config::Config::builder().add_source(config::Environment::default());
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.as_str())?;
    }
    Ok(builder.build()?)
}

#[derive(Deserialize)]
struct OverlayEnv {
    #[serde(default = "default_overlay_url")]
    reitti_url: String,
    reitti_api_token: Option<SecretString>,
    #[serde(default = "default_start_year")]
    start_year: i32,
    end_year: Option<i32>,
    target_date: Option<String>,
    #[serde(default = "default_min_export_bytes")]
    min_export_bytes: u64,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

/// Settings for the path overlay generator.
#[derive(Debug)]
pub struct OverlaySettings {
    pub base_url: Url,
    pub api_token: SecretString,
    pub years: YearRange,
    pub target: MonthDay,
    /// Exports of this many bytes or fewer count as "no data".
    pub min_export_bytes: u64,
    pub export_timeout: Duration,
    pub output_dir: PathBuf,
}

impl OverlaySettings {
    pub fn from_env(overrides: &[(&str, String)], today: NaiveDate) -> ReittiResult<Self> {
        Self::from_config(env_config(overrides)?, today)
    }

    pub fn from_config(cfg: config::Config, today: NaiveDate) -> ReittiResult<Self> {
        let raw: OverlayEnv = cfg.try_deserialize()?;

        let api_token = raw
            .reitti_api_token
            .filter(|t| !t.expose_secret().is_empty())
            .ok_or_else(|| ReittiError::config("REITTI_API_TOKEN not set"))?;

        Ok(Self {
            base_url: parse_base_url(&raw.reitti_url)?,
            api_token,
            years: YearRange::new(raw.start_year, raw.end_year.unwrap_or(today.year()))?,
            target: target_day(raw.target_date.as_deref(), today)?,
            min_export_bytes: raw.min_export_bytes,
            export_timeout: EXPORT_TIMEOUT,
            output_dir: raw.output_dir,
        })
    }

    /// `<output_dir>/path_overlay_<MM-DD>_<start>-<end>.html`
    pub fn output_file(&self) -> PathBuf {
        self.output_dir.join(format!(
            "path_overlay_{}_{}.html",
            self.target.label(),
            self.years.label()
        ))
    }
}

#[derive(Deserialize)]
struct CollageEnv {
    #[serde(default = "default_collage_url")]
    reitti_url: String,
    reitti_username: Option<String>,
    reitti_password: Option<SecretString>,
    #[serde(default = "default_true")]
    reitti_login: bool,
    #[serde(default = "default_start_year")]
    start_year: i32,
    target_date: Option<String>,
    #[serde(default = "default_wait_time")]
    wait_time: u64,
    #[serde(default = "default_login_wait_time")]
    login_wait_time: u64,
    ready_selector: Option<String>,
    #[serde(default = "default_width")]
    screenshot_width: u32,
    #[serde(default = "default_height")]
    screenshot_height: u32,
    #[serde(default = "default_columns")]
    collage_columns: u32,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Settings for the screenshot collage generator.
#[derive(Debug)]
pub struct CollageSettings {
    pub base_url: Url,
    /// `None` when login is disabled; the day views are then captured anonymously.
    pub credentials: Option<Credentials>,
    /// Always ends at the current year.
    pub years: YearRange,
    pub target: MonthDay,
    pub viewport: Viewport,
    pub readiness: Readiness,
    pub login_wait: Duration,
    pub columns: u32,
    pub output_dir: PathBuf,
}

impl CollageSettings {
    pub fn from_env(overrides: &[(&str, String)], today: NaiveDate) -> ReittiResult<Self> {
        Self::from_config(env_config(overrides)?, today)
    }

    pub fn from_config(cfg: config::Config, today: NaiveDate) -> ReittiResult<Self> {
        let raw: CollageEnv = cfg.try_deserialize()?;

        let credentials = if raw.reitti_login {
            let username = raw.reitti_username.filter(|u| !u.is_empty());
            let password = raw
                .reitti_password
                .filter(|p| !p.expose_secret().is_empty());
            match (username, password) {
                (Some(username), Some(password)) => Some(Credentials { username, password }),
                _ => {
                    return Err(ReittiError::config(
                        "REITTI_USERNAME and REITTI_PASSWORD environment variables must be set",
                    ));
                }
            }
        } else {
            None
        };

        if raw.collage_columns == 0 {
            return Err(ReittiError::config("COLLAGE_COLUMNS must be at least 1"));
        }
        if raw.screenshot_width == 0 || raw.screenshot_height == 0 {
            return Err(ReittiError::config(
                "SCREENSHOT_WIDTH/SCREENSHOT_HEIGHT must be non-zero",
            ));
        }

        let wait = Duration::from_secs(raw.wait_time);
        let readiness = match raw.ready_selector.filter(|s| !s.trim().is_empty()) {
            Some(selector) => Readiness::Selector {
                selector,
                timeout: wait,
            },
            None => Readiness::Fixed(wait),
        };

        Ok(Self {
            base_url: parse_base_url(&raw.reitti_url)?,
            credentials,
            years: YearRange::new(raw.start_year, today.year())?,
            target: target_day(raw.target_date.as_deref(), today)?,
            viewport: Viewport {
                width: raw.screenshot_width,
                height: raw.screenshot_height,
            },
            readiness,
            login_wait: Duration::from_secs(raw.login_wait_time),
            columns: raw.collage_columns,
            output_dir: raw.output_dir,
        })
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.output_dir.join("screenshots")
    }

    pub fn collage_dir(&self) -> PathBuf {
        self.output_dir.join("collages")
    }

    /// `<output_dir>/collages/reitti_collage_<MM-DD>_<start>-<end>.png`
    pub fn collage_file(&self) -> PathBuf {
        self.collage_dir().join(format!(
            "reitti_collage_{}_{}.png",
            self.target.label(),
            self.years.label()
        ))
    }
}

fn parse_base_url(raw: &str) -> ReittiResult<Url> {
    Url::parse(raw.trim())
        .map_err(|e| ReittiError::config(format!("invalid REITTI_URL '{raw}': {e}")))
}

fn target_day(raw: Option<&str>, today: NaiveDate) -> ReittiResult<MonthDay> {
    match raw.filter(|s| !s.trim().is_empty()) {
        Some(s) => Ok(MonthDay::of(parse_date(s)?)),
        None => Ok(MonthDay::of(today)),
    }
}
