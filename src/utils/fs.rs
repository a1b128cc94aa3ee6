//! File system utilities.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Write an HTML document, appending `.html` when the name lacks it.
///
/// Returns the path actually written.
pub fn save_html(path: &Path, html: &str) -> Result<PathBuf> {
    let path = if path.extension().is_some_and(|ext| ext == "html") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".html");
        PathBuf::from(name)
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(&path, html)?;
    Ok(path)
}
