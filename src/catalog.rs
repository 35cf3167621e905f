//! SKUマスタの読み込み
//!
//! 拡張子で形式を判定する。
//! - `.json`: `{"商品名": "SKU"}` または `[{"name": .., "sku": ..}]`
//! - `.csv`: 1行目はヘッダ、以降 `name,sku`
//! - `.xlsx` / `.xls` / `.ods`: 先頭シートのA列（商品名）とB列（SKU）

use crate::error::{Result, SkuReconError};
use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;
use sku_recon_common::CatalogEntry;
use std::path::Path;

pub fn load(path: &Path) -> Result<Vec<CatalogEntry>> {
    if !path.exists() {
        return Err(SkuReconError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let entries = match ext.as_str() {
        "json" => from_json(&std::fs::read_to_string(path)?)?,
        "csv" => from_csv(&std::fs::read_to_string(path)?)?,
        "xlsx" | "xlsm" | "xls" | "ods" => from_spreadsheet(path)?,
        _ => {
            return Err(SkuReconError::InvalidCatalog(format!(
                "未対応の形式です: {}",
                path.display()
            )))
        }
    };

    tracing::info!(path = %path.display(), products = entries.len(), "catalog loaded");
    Ok(entries)
}

/// JSON形式のマスタ
pub fn from_json(content: &str) -> Result<Vec<CatalogEntry>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, sku)| match sku {
                Value::String(sku) => Ok(CatalogEntry::new(name, sku)),
                Value::Number(n) => Ok(CatalogEntry::new(name, n.to_string())),
                other => Err(SkuReconError::InvalidCatalog(format!(
                    "SKUが文字列ではありません: {} => {}",
                    name, other
                ))),
            })
            .collect(),
        value @ Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Err(SkuReconError::InvalidCatalog(
            "オブジェクトまたは配列が必要です".into(),
        )),
    }
}

/// CSV形式のマスタ（1行目はヘッダ）
pub fn from_csv(content: &str) -> Result<Vec<CatalogEntry>> {
    let mut entries = Vec::new();

    for (line_no, fields) in csv_records(content).into_iter().skip(1) {
        if fields.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match (fields.first(), fields.get(1)) {
            (Some(name), Some(sku)) if !name.trim().is_empty() && !sku.trim().is_empty() => {
                entries.push(CatalogEntry::new(name.trim(), sku.trim()));
            }
            _ => tracing::warn!(line = line_no, "skipping catalog row without name or sku"),
        }
    }

    Ok(entries)
}

/// レコード単位に分割（`"` 囲み、`""` エスケープ、囲み内の改行に対応）
///
/// 各レコードは開始行番号（1始まり）と共に返す。
fn csv_records(content: &str) -> Vec<(usize, Vec<String>)> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line_no = 1;
    let mut record_start = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                records.push((record_start, std::mem::take(&mut fields)));
                line_no += 1;
                record_start = line_no;
            }
            '\n' => {
                current.push(c);
                line_no += 1;
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        records.push((record_start, fields));
    }
    records
}

fn from_spreadsheet(path: &Path) -> Result<Vec<CatalogEntry>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SkuReconError::InvalidCatalog(format!("シートがありません: {}", path.display())))??;

    let mut entries = Vec::new();
    for (row_no, row) in range.rows().enumerate().skip(1) {
        let name = row.first().map(cell_text).unwrap_or_default();
        let sku = row.get(1).map(cell_text).unwrap_or_default();
        if name.is_empty() || sku.is_empty() {
            tracing::warn!(row = row_no + 1, "skipping catalog row without name or sku");
            continue;
        }
        entries.push(CatalogEntry::new(name, sku));
    }

    Ok(entries)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}
