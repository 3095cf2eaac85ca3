use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use reitti_thisday::{
    ChromeSession, CollageSettings, ReittiError, ReittiResult, capture_days, write_collage,
};

/// Capture the Reitti day view of one calendar day for every year and tile the screenshots
/// into a collage.
///
/// Connection, login and capture options come from the environment (REITTI_URL,
/// REITTI_USERNAME, REITTI_PASSWORD, REITTI_LOGIN, START_YEAR, TARGET_DATE, WAIT_TIME,
/// READY_SELECTOR, SCREENSHOT_WIDTH, SCREENSHOT_HEIGHT, COLLAGE_COLUMNS, OUTPUT_DIR).
#[derive(Parser, Debug)]
#[command(name = "reitti_collage", version)]
struct Cli {
    /// Day to capture as YYYY-MM-DD (only month and day are used). Overrides TARGET_DATE.
    #[arg(long)]
    target_date: Option<String>,

    /// Root directory for screenshots and collages. Overrides OUTPUT_DIR.
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

fn main() -> ExitCode {
    reitti_thisday::init_logging();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            if matches!(e, ReittiError::Authentication(_)) {
                tracing::error!("check that REITTI_USERNAME and REITTI_PASSWORD are correct");
                tracing::error!("and that REITTI_URL points at the Reitti web interface");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> ReittiResult<()> {
    let today = chrono::Local::now().date_naive();
    let settings = CollageSettings::from_env(&cli.overrides(), today)?;

    tracing::info!("Reitti screenshot collage generator");
    tracing::info!("Reitti URL: {}", settings.base_url);
    tracing::info!(
        "target date: {} (across years {})",
        settings.target,
        settings.years.label()
    );

    let shots = {
        let mut session = ChromeSession::launch(settings.viewport)?;
        match &settings.credentials {
            Some(credentials) => {
                tracing::info!("logging in to {}", settings.base_url);
                session.login(&settings.base_url, credentials, settings.login_wait)?;
                tracing::info!("✓ logged in");
            }
            None => tracing::info!("login disabled, capturing without a session"),
        }
        capture_days(
            &mut session,
            &settings.base_url,
            settings.target,
            settings.years,
            &settings.readiness,
            &settings.screenshot_dir(),
        )?
    };

    if shots.is_empty() {
        tracing::warn!("no screenshots captured, skipping collage");
        tracing::info!("done");
        return Ok(());
    }

    let out = settings.collage_file();
    match write_collage(&shots.paths(), &out, settings.columns) {
        Ok(summary) => {
            tracing::info!(
                "collage of {} images ({}x{} grid, {}x{} px)",
                summary.images,
                summary.columns,
                summary.rows,
                summary.width,
                summary.height
            );
            eprintln!("wrote {}", out.display());
        }
        Err(e) if e.is_no_data() => tracing::warn!("{e}"),
        Err(e) => return Err(e),
    }

    tracing::info!("done");
    Ok(())
}
