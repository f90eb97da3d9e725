use std::path::PathBuf;

/// Chart output directory from environment variable or use default
pub fn charts_dir() -> PathBuf {
    std::env::var("CHARTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("charts"))
}
