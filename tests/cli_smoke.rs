use std::path::PathBuf;

const PATH_OVERLAY: &str = env!("CARGO_BIN_EXE_path_overlay");
const REITTI_COLLAGE: &str = env!("CARGO_BIN_EXE_reitti_collage");

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

#[test]
fn path_overlay_without_token_fails() {
    let status = std::process::Command::new(PATH_OVERLAY)
        .env_clear()
        .env("OUTPUT_DIR", temp_dir("cli_no_token"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn path_overlay_with_unreachable_server_exits_cleanly_without_output() {
    let out_dir = temp_dir("cli_overlay");
    let out_arg = out_dir.to_string_lossy().to_string();

    let status = std::process::Command::new(PATH_OVERLAY)
        .env_clear()
        .env("REITTI_URL", "http://127.0.0.1:9")
        .env("REITTI_API_TOKEN", "token")
        .env("START_YEAR", "2020")
        .env("END_YEAR", "2020")
        .args(["--target-date", "2024-05-01", "--output-dir"])
        .arg(out_arg.as_str())
        .status()
        .unwrap();

    assert!(status.success());
    assert!(!out_dir.join("path_overlay_05-01_2020-2020.html").exists());
    std::fs::remove_dir_all(&out_dir).ok();
}

#[test]
fn reitti_collage_without_credentials_exits_with_one() {
    let status = std::process::Command::new(REITTI_COLLAGE)
        .env_clear()
        .env("OUTPUT_DIR", temp_dir("cli_no_creds"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}
