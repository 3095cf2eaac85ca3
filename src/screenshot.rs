use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use chrono::NaiveDate;
use url::Url;

use crate::{
    browser::PageSession,
    foundation::{
        core::{MonthDay, YearRange},
        error::ReittiResult,
        fs::ensure_dir,
    },
    model::ScreenshotSet,
};

/// How to decide that a freshly opened day view has finished rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// Sleep for a fixed time.
    Fixed(Duration),
    /// Poll until `selector` matches, giving up after `timeout`.
    Selector { selector: String, timeout: Duration },
}

impl Default for Readiness {
    fn default() -> Self {
        Self::Fixed(Duration::from_secs(5))
    }
}

/// `<base>?date=YYYY-MM-DD`
pub fn day_view_url(base: &Url, date: NaiveDate) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("date", &date.format("%Y-%m-%d").to_string());
    url
}

/// `<dir>/reitti_YYYY-MM-DD.png`
pub fn screenshot_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("reitti_{}.png", date.format("%Y-%m-%d")))
}

/// Capture the day view of `target` for every year in `years` into `dir`.
///
/// Years that fail to load or capture are logged and left out of the result.
#[tracing::instrument(skip(session, base_url, readiness), fields(day = %target))]
pub fn capture_days(
    session: &mut dyn PageSession,
    base_url: &Url,
    target: MonthDay,
    years: YearRange,
    readiness: &Readiness,
    dir: &Path,
) -> ReittiResult<ScreenshotSet> {
    ensure_dir(dir)?;
    let mut shots = ScreenshotSet::new();

    for year in years.years() {
        let Some(date) = target.in_year(year) else {
            tracing::warn!("{year}: {target} does not exist this year, skipping");
            continue;
        };
        let url = day_view_url(base_url, date);
        let out = screenshot_path(dir, date);
        tracing::info!("capturing {url}");

        match capture_one(session, &url, readiness, &out) {
            Ok(()) => {
                tracing::info!("  ✓ saved to {}", out.display());
                shots.push(year, out);
            }
            Err(e) => tracing::warn!("  ✗ {date}: {e}"),
        }
    }

    tracing::info!("✓ captured {} screenshots", shots.len());
    Ok(shots)
}

fn capture_one(
    session: &mut dyn PageSession,
    url: &Url,
    readiness: &Readiness,
    out: &Path,
) -> ReittiResult<()> {
    session.open(url)?;
    session.settle(readiness)?;
    let png = session.capture_png()?;
    std::fs::write(out, png).with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}
