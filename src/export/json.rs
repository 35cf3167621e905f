use crate::error::Result;
use crate::pipeline::BatchReport;
use std::path::Path;

/// レポートをJSONで書き出す
pub fn write_json(report: &BatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
