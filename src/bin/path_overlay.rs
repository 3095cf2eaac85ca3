use std::path::PathBuf;

use clap::Parser;
use reitti_thisday::{OverlaySettings, ReittiApiClient, fetch_year_paths, write_overlay};

/// Overlay the GPS paths of one calendar day across years on a single Leaflet map.
///
/// Connection and year range come from the environment (REITTI_URL, REITTI_API_TOKEN,
/// START_YEAR, END_YEAR, TARGET_DATE, MIN_EXPORT_BYTES, OUTPUT_DIR).
#[derive(Parser, Debug)]
#[command(name = "path_overlay", version)]
struct Cli {
    /// Day to show as YYYY-MM-DD (only month and day are used). Overrides TARGET_DATE.
    #[arg(long)]
    target_date: Option<String>,

    /// Directory for the generated HTML. Overrides OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(date) = &self.target_date {
            out.push(("target_date", date.clone()));
        }
        if let Some(dir) = &self.output_dir {
            out.push(("output_dir", dir.to_string_lossy().into_owned()));
        }
        out
    }
}

fn main() -> anyhow::Result<()> {
    reitti_thisday::init_logging();
    let cli = Cli::parse();

    let today = chrono::Local::now().date_naive();
    let settings = OverlaySettings::from_env(&cli.overrides(), today)?;
    let day = settings.target.label();

    tracing::info!("Reitti multi-year path overlay generator");
    tracing::info!("Reitti URL: {}", settings.base_url);
    tracing::info!(
        "target date: {day} (across years {})",
        settings.years.label()
    );

    let client = ReittiApiClient::new(
        &settings.base_url,
        &settings.api_token,
        settings.export_timeout,
    )?;
    let paths = fetch_year_paths(
        &client,
        settings.target,
        settings.years,
        settings.min_export_bytes,
    );

    if paths.is_empty() {
        tracing::warn!(
            "no path data found for {day} in any year from {}",
            settings.years.label()
        );
        tracing::warn!("location tracking may have been off on {day} in these years");
        return Ok(());
    }

    let out = settings.output_file();
    let summary = write_overlay(&paths, &out, &day)?;

    tracing::info!(
        "success: overlay for {day} with {} years of data ({} points)",
        summary.years,
        summary.total_points
    );
    eprintln!("wrote {}", out.display());
    Ok(())
}
