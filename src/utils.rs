//! Input-file and file system helpers.
//!
//! - Reading the list of article URLs
//! - Checking that the store's directory is writable before any fetching

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Read the input link list: one URL per line, surrounding whitespace
/// trimmed, blank lines dropped. Order and duplicates are kept.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn read_links(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let raw = fs::read_to_string(path).await?;
    let links = parse_links(&raw);
    info!(count = links.len(), "Read input links");
    Ok(links)
}

fn parse_links(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ensure the directory that will hold `file` exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file so
/// that a bad output location is reported before minutes of scraping are
/// thrown away.
#[instrument(level = "info", skip_all, fields(file = %file.display()))]
pub async fn ensure_writable_parent(file: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
