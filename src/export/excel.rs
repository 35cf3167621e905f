//! Excel出力
//!
//! シート構成
//! - Matched: SKU別集計
//! - Unmatched: 照合できなかった行と第一候補
//! - Lines: 入力行ごとの照合結果

use crate::error::Result;
use crate::pipeline::BatchReport;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};
use std::path::Path;

const MATCHED_HEADERS: &[(&str, f64)] = &[
    ("Document", 24.0),
    ("SKU", 14.0),
    ("Master Name", 40.0),
    ("Total Qty", 10.0),
    ("Count", 8.0),
    ("Avg Confidence", 14.0),
    ("Needs Review", 12.0),
];

const UNMATCHED_HEADERS: &[(&str, f64)] = &[
    ("Document", 24.0),
    ("Product Name", 40.0),
    ("Qty", 8.0),
    ("OCR Confidence", 14.0),
    ("Top Suggestion", 40.0),
    ("Suggestion SKU", 14.0),
    ("Suggestion Score", 14.0),
];

const LINE_HEADERS: &[(&str, f64)] = &[
    ("Document", 24.0),
    ("Product Name", 40.0),
    ("Qty", 8.0),
    ("SKU", 14.0),
    ("SKU Confidence", 14.0),
    ("OCR Confidence", 14.0),
    ("Needs Review", 12.0),
    ("Issue", 14.0),
    ("Error", 30.0),
];

/// レポートをExcelで書き出す
pub fn write_excel(report: &BatchReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));
    let review_format = Format::new().set_background_color(Color::RGB(0xFFF2CC));

    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    prepare_sheet(sheet, "Matched", MATCHED_HEADERS, &header_format)?;
    let mut row = 1;
    for doc in &report.documents {
        for item in &doc.aggregation.matched {
            sheet.write_string(row, 0, &doc.document)?;
            sheet.write_string(row, 1, &item.sku)?;
            sheet.write_string(row, 2, &item.master_name)?;
            sheet.write_number(row, 3, item.total_qty as f64)?;
            sheet.write_number(row, 4, item.count as f64)?;
            sheet.write_number(row, 5, item.avg_confidence)?;
            if item.needs_review {
                sheet.write_boolean_with_format(row, 6, true, &review_format)?;
            } else {
                sheet.write_boolean(row, 6, false)?;
            }
            row += 1;
        }
    }

    let sheet = workbook.add_worksheet();
    prepare_sheet(sheet, "Unmatched", UNMATCHED_HEADERS, &header_format)?;
    let mut row = 1;
    for doc in &report.documents {
        for item in &doc.aggregation.unmatched {
            sheet.write_string(row, 0, &doc.document)?;
            sheet.write_string(row, 1, &item.product_name)?;
            sheet.write_number(row, 2, item.quantity as f64)?;
            sheet.write_number(row, 3, item.ocr_confidence)?;
            if let Some(top) = item.suggestions.first() {
                sheet.write_string(row, 4, &top.name)?;
                sheet.write_string(row, 5, &top.sku)?;
                sheet.write_number(row, 6, top.score)?;
            }
            row += 1;
        }
    }

    let sheet = workbook.add_worksheet();
    prepare_sheet(sheet, "Lines", LINE_HEADERS, &header_format)?;
    let mut row = 1;
    for doc in &report.documents {
        for line in &doc.aggregation.entries {
            sheet.write_string(row, 0, &doc.document)?;
            if let Some(name) = &line.product_name {
                sheet.write_string(row, 1, name)?;
            }
            if let Some(qty) = line.quantity {
                sheet.write_number(row, 2, qty as f64)?;
            }
            if let Some(sku) = &line.sku {
                sheet.write_string(row, 3, sku)?;
            }
            sheet.write_number(row, 4, line.sku_confidence)?;
            sheet.write_number(row, 5, line.ocr_confidence)?;
            sheet.write_boolean(row, 6, line.needs_review)?;
            if let Some(issue) = line.issue {
                sheet.write_string(row, 7, issue_label(issue))?;
            }
            if let Some(error) = &line.error {
                sheet.write_string(row, 8, error)?;
            }
            row += 1;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn prepare_sheet(
    sheet: &mut Worksheet,
    name: &str,
    headers: &[(&str, f64)],
    header_format: &Format,
) -> Result<()> {
    sheet.set_name(name)?;
    for (col, (title, width)) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, header_format)?;
        sheet.set_column_width(col, *width)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn issue_label(issue: sku_recon_common::Issue) -> &'static str {
    use sku_recon_common::Issue;
    match issue {
        Issue::Unresolvable => "unresolvable",
        Issue::Ambiguous => "ambiguous",
        Issue::Unprocessable => "unprocessable",
        Issue::QuantityOverflow => "quantity_overflow",
    }
}
