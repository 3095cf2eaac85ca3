use std::{path::PathBuf, time::Duration};

use reitti_thisday::{
    MonthDay, PageSession, Readiness, ReittiError, ReittiResult, YearRange, capture_days,
};
use url::Url;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "reitti_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// Fake page that fails to load any URL mentioning `broken`.
struct FakePage {
    broken: &'static str,
    current: Option<Url>,
    opened: Vec<String>,
    settled: usize,
}

impl FakePage {
    fn new(broken: &'static str) -> Self {
        Self {
            broken,
            current: None,
            opened: Vec::new(),
            settled: 0,
        }
    }
}

impl PageSession for FakePage {
    fn open(&mut self, url: &Url) -> ReittiResult<()> {
        self.opened.push(url.to_string());
        if url.as_str().contains(self.broken) {
            return Err(ReittiError::browser("net::ERR_CONNECTION_RESET"));
        }
        self.current = Some(url.clone());
        Ok(())
    }

    fn settle(&mut self, _readiness: &Readiness) -> ReittiResult<()> {
        self.settled += 1;
        Ok(())
    }

    fn capture_png(&mut self) -> ReittiResult<Vec<u8>> {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        Ok(png)
    }
}

#[test]
fn failed_year_is_left_out_and_the_rest_are_saved() {
    let tmp = temp_dir("capture_days");
    let dir = tmp.join("screenshots");
    let mut page = FakePage::new("2021-");

    let base = Url::parse("http://reitti:8030/").unwrap();
    let shots = capture_days(
        &mut page,
        &base,
        MonthDay::new(6, 1).unwrap(),
        YearRange::new(2020, 2022).unwrap(),
        &Readiness::Fixed(Duration::ZERO),
        &dir,
    )
    .unwrap();

    assert_eq!(
        page.opened,
        vec![
            "http://reitti:8030/?date=2020-06-01",
            "http://reitti:8030/?date=2021-06-01",
            "http://reitti:8030/?date=2022-06-01",
        ]
    );
    assert_eq!(page.settled, 2);
    assert_eq!(
        shots.iter().map(|s| s.year).collect::<Vec<_>>(),
        vec![2020, 2022]
    );
    assert_eq!(
        shots.paths(),
        vec![
            dir.join("reitti_2020-06-01.png"),
            dir.join("reitti_2022-06-01.png")
        ]
    );
    assert!(shots.paths().iter().all(|p| p.exists()));
    assert!(!dir.join("reitti_2021-06-01.png").exists());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn leap_day_only_visits_leap_years() {
    let tmp = temp_dir("capture_leap");
    let mut page = FakePage::new("never");

    let base = Url::parse("http://reitti:8030/").unwrap();
    let shots = capture_days(
        &mut page,
        &base,
        MonthDay::new(2, 29).unwrap(),
        YearRange::new(2023, 2024).unwrap(),
        &Readiness::Fixed(Duration::ZERO),
        &tmp,
    )
    .unwrap();

    assert_eq!(page.opened, vec!["http://reitti:8030/?date=2024-02-29"]);
    assert_eq!(shots.len(), 1);

    std::fs::remove_dir_all(&tmp).ok();
}
