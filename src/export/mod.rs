pub mod excel;
pub mod json;

use crate::cli::ExportFormat;
use crate::error::Result;
use crate::pipeline::BatchReport;
use std::path::{Path, PathBuf};

pub use excel::write_excel;
pub use json::write_json;

/// 出力先の拡張子が形式と違う場合は形式の拡張子に置き換える
fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    match output.extension() {
        _ if output.is_dir() => output.join(format!("{}.{}", title, extension)),
        None => output.join(format!("{}.{}", title, extension)),
        Some(ext) if ext.to_string_lossy().eq_ignore_ascii_case(extension) => output.to_path_buf(),
        Some(_) => output.with_extension(extension),
    }
}

fn output_paths_for_both(output: &Path, title: &str) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        (
            output.join(format!("{}.json", title)),
            output.join(format!("{}.xlsx", title)),
        )
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        (
            parent.join(format!("{}.json", stem)),
            parent.join(format!("{}.xlsx", stem)),
        )
    }
}

/// 指定形式でレポートを書き出し、書き出したパスを返す
pub fn export_report(
    report: &BatchReport,
    format: &ExportFormat,
    output: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let paths = match format {
        ExportFormat::Json => {
            let path = output_path_for_format(output, title, "json");
            write_json(report, &path)?;
            vec![path]
        }
        ExportFormat::Excel => {
            let path = output_path_for_format(output, title, "xlsx");
            write_excel(report, &path)?;
            vec![path]
        }
        ExportFormat::Both => {
            let (json_path, excel_path) = output_paths_for_both(output, title);
            write_json(report, &json_path)?;
            write_excel(report, &excel_path)?;
            vec![json_path, excel_path]
        }
    };

    for path in &paths {
        tracing::debug!(path = %path.display(), "report written");
    }
    Ok(paths)
}
