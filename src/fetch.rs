use std::{io::Read as _, time::Duration};

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    foundation::{
        core::{MonthDay, YearRange},
        error::{ReittiError, ReittiResult},
    },
    gpx::parse_gpx_coordinates,
    model::PathCollection,
};

pub const GPX_EXPORT_PATH: &str = "api/v1/gpx/export";

const API_TOKEN_HEADER: &str = "X-API-TOKEN";
// Upper bound on a single day's export body.
const MAX_EXPORT_BYTES: u64 = 256 * 1024 * 1024;

/// Raw answer of the export endpoint for one day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Something that can produce the GPX export for a single day.
pub trait ExportSource {
    fn export_day(&self, date: NaiveDate) -> ReittiResult<ExportResponse>;
}

/// Resolve `path` below `base`, keeping any path prefix `base` already has.
pub fn endpoint(base: &Url, path: &str) -> ReittiResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|e| ReittiError::config(format!("cannot build '{path}' url from '{base}': {e}")))
}

/// Blocking client for the Reitti GPX export API.
pub struct ReittiApiClient {
    agent: ureq::Agent,
    export_url: Url,
    token: SecretString,
}

impl ReittiApiClient {
    pub fn new(base_url: &Url, token: &SecretString, timeout: Duration) -> ReittiResult<Self> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Ok(Self {
            agent,
            export_url: endpoint(base_url, GPX_EXPORT_PATH)?,
            token: token.clone(),
        })
    }

    pub fn export_url(&self) -> &Url {
        &self.export_url
    }
}

impl ExportSource for ReittiApiClient {
    fn export_day(&self, date: NaiveDate) -> ReittiResult<ExportResponse> {
        let day = date.format("%Y-%m-%d").to_string();
        let result = self
            .agent
            .get(self.export_url.as_str())
            .set(API_TOKEN_HEADER, self.token.expose_secret())
            .query("start", &day)
            .query("end", &day)
            .call();

        // ureq reports non-2xx statuses as errors; the caller decides what a status means.
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(t)) => {
                return Err(ReittiError::http(format!("GET {}: {t}", self.export_url)));
            }
        };

        let status = response.status();
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_EXPORT_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| ReittiError::http(format!("reading export for {day}: {e}")))?;

        Ok(ExportResponse { status, body })
    }
}

/// Fetch and parse the target day's path for every year in `years`.
///
/// Each year is independent: a failed request, a non-200 answer, an export of
/// `min_export_bytes` or fewer, or a document without coordinates drops that year and the
/// loop moves on.
#[tracing::instrument(skip(source), fields(day = %target))]
pub fn fetch_year_paths(
    source: &dyn ExportSource,
    target: MonthDay,
    years: YearRange,
    min_export_bytes: u64,
) -> PathCollection {
    let mut paths = PathCollection::new();

    for year in years.years() {
        let Some(date) = target.in_year(year) else {
            tracing::warn!("{year}: {target} does not exist this year, skipping");
            continue;
        };
        tracing::info!("fetching {date}...");

        let response = match source.export_day(date) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("  ✗ {date}: {e}");
                continue;
            }
        };

        let size = response.body.len() as u64;
        if response.status != 200 || size <= min_export_bytes {
            tracing::info!(
                "  ✗ {date}: no data ({size} bytes, status {})",
                response.status
            );
            continue;
        }

        let coords = parse_gpx_coordinates(&String::from_utf8_lossy(&response.body));
        if coords.is_empty() {
            tracing::info!("  ✗ {date}: no coordinates parsed");
            continue;
        }

        tracing::info!("  ✓ {date}: {} points", coords.len());
        paths.insert(year, coords);
    }

    paths
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::BTreeMap};

    use chrono::Datelike;

    use super::*;
    use crate::foundation::core::Coordinate;

    struct ScriptedSource {
        answers: BTreeMap<i32, ReittiResult<ExportResponse>>,
        asked: RefCell<Vec<NaiveDate>>,
    }

    impl ScriptedSource {
        fn new() -> Self {
            Self {
                answers: BTreeMap::new(),
                asked: RefCell::new(Vec::new()),
            }
        }

        fn answer(mut self, year: i32, answer: ReittiResult<ExportResponse>) -> Self {
            self.answers.insert(year, answer);
            self
        }
    }

    impl ExportSource for ScriptedSource {
        fn export_day(&self, date: NaiveDate) -> ReittiResult<ExportResponse> {
            self.asked.borrow_mut().push(date);
            match self.answers.get(&date.year()) {
                Some(Ok(r)) => Ok(r.clone()),
                Some(Err(e)) => Err(ReittiError::http(e.to_string())),
                None => Ok(ExportResponse {
                    status: 404,
                    body: Vec::new(),
                }),
            }
        }
    }

    fn gpx_body(points: &[(f64, f64)]) -> Vec<u8> {
        let mut doc = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="test"><trk><trkseg>"#,
        );
        for (lat, lon) in points {
            doc.push_str(&format!(r#"<trkpt lat="{lat}" lon="{lon}"></trkpt>"#));
        }
        doc.push_str("</trkseg></trk></gpx>");
        doc.into_bytes()
    }

    fn ok(body: Vec<u8>) -> ReittiResult<ExportResponse> {
        Ok(ExportResponse { status: 200, body })
    }

    #[test]
    fn one_failed_year_does_not_stop_the_others() {
        let source = ScriptedSource::new()
            .answer(2020, ok(gpx_body(&[(1.0, 2.0), (3.0, 4.0)])))
            .answer(2021, Err(ReittiError::http("timed out")))
            .answer(2022, ok(gpx_body(&[(5.0, 6.0)])));

        let target = MonthDay::new(5, 1).unwrap();
        let years = YearRange::new(2020, 2022).unwrap();
        let paths = fetch_year_paths(&source, target, years, 0);

        assert_eq!(paths.years().collect::<Vec<_>>(), vec![2020, 2022]);
        assert_eq!(paths.get(2022).unwrap(), &[Coordinate::new(5.0, 6.0)]);
        assert_eq!(source.asked.borrow().len(), 3);
    }

    #[test]
    fn undersized_and_non_ok_exports_are_dropped() {
        let body = gpx_body(&[(1.0, 2.0)]);
        let size = body.len() as u64;
        let source = ScriptedSource::new()
            .answer(2020, ok(body.clone()))
            .answer(
                2021,
                Ok(ExportResponse {
                    status: 500,
                    body: gpx_body(&[(1.0, 2.0), (1.0, 2.0), (1.0, 2.0)]),
                }),
            );

        let target = MonthDay::new(5, 1).unwrap();
        let years = YearRange::new(2020, 2021).unwrap();

        // Exactly at the threshold counts as "no data".
        assert!(fetch_year_paths(&source, target, years, size).is_empty());

        let paths = fetch_year_paths(&source, target, years, size - 1);
        assert_eq!(paths.years().collect::<Vec<_>>(), vec![2020]);
    }

    #[test]
    fn unparseable_export_is_dropped() {
        let source = ScriptedSource::new().answer(2020, ok(b"<html>oops".to_vec()));
        let target = MonthDay::new(5, 1).unwrap();
        let years = YearRange::new(2020, 2020).unwrap();
        assert!(fetch_year_paths(&source, target, years, 0).is_empty());
    }

    #[test]
    fn leap_day_skips_years_without_it() {
        let source = ScriptedSource::new();
        let target = MonthDay::new(2, 29).unwrap();
        let years = YearRange::new(2023, 2024).unwrap();
        fetch_year_paths(&source, target, years, 0);
        assert_eq!(
            *source.asked.borrow(),
            vec![NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()]
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let base = Url::parse("http://host:8030").unwrap();
        assert_eq!(
            endpoint(&base, GPX_EXPORT_PATH).unwrap().as_str(),
            "http://host:8030/api/v1/gpx/export"
        );

        let prefixed = Url::parse("https://example.org/reitti").unwrap();
        assert_eq!(
            endpoint(&prefixed, GPX_EXPORT_PATH).unwrap().as_str(),
            "https://example.org/reitti/api/v1/gpx/export"
        );
    }
}
