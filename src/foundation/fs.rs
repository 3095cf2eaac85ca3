use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::ReittiResult;

pub fn ensure_dir(dir: &Path) -> ReittiResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory '{}'", dir.display()))?;
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> ReittiResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
