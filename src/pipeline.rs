//! OCRドキュメントの一括照合・集計

use crate::scanner::{self, DocumentInfo};
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sku_recon_common::{Aggregation, SharedMatcher, SkuAggregator};

/// 1ドキュメント分の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub document: String,
    pub line_count: usize,
    #[serde(flatten)]
    pub aggregation: Aggregation,
    /// 読み込みエラーと行に付いたOCRエラー
    pub errors: Vec<String>,
}

impl DocumentReport {
    fn failed(document: String, error: String) -> Self {
        Self {
            document,
            errors: vec![error],
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// RFC 3339
    pub generated_at: String,
    pub documents: Vec<DocumentReport>,
}

impl BatchReport {
    pub fn new(documents: Vec<DocumentReport>) -> Self {
        Self {
            generated_at: Local::now().to_rfc3339(),
            documents,
        }
    }

    pub fn matched_count(&self) -> usize {
        self.documents.iter().map(|d| d.aggregation.matched.len()).sum()
    }

    pub fn unmatched_count(&self) -> usize {
        self.documents.iter().map(|d| d.aggregation.unmatched.len()).sum()
    }

    pub fn review_count(&self) -> usize {
        self.documents.iter().map(|d| d.aggregation.review_count()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.documents.iter().map(|d| d.errors.len()).sum()
    }
}

/// ドキュメントを並列に照合・集計する
///
/// 全ドキュメントが同じ照合器スナップショットを使う。読み込みに失敗した
/// ドキュメントは空の結果とエラーを持つレポートになり、処理は続行する。
pub fn process_documents(
    documents: &[DocumentInfo],
    matcher: &SharedMatcher,
    aggregator: &SkuAggregator,
    verbose: bool,
) -> BatchReport {
    let snapshot = matcher.load();

    let progress = if verbose {
        let pb = ProgressBar::new(documents.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let reports: Vec<DocumentReport> = documents
        .par_iter()
        .map(|doc| {
            let report = match scanner::load_document(&doc.path) {
                Ok(lines) => {
                    let aggregation = aggregator.aggregate(&lines, snapshot.as_ref());
                    let errors = aggregation.errors();
                    DocumentReport {
                        document: doc.file_name.clone(),
                        line_count: lines.len(),
                        aggregation,
                        errors,
                    }
                }
                Err(e) => {
                    tracing::warn!(document = %doc.file_name, error = %e, "failed to load document");
                    DocumentReport::failed(doc.file_name.clone(), e.to_string())
                }
            };
            if let Some(pb) = &progress {
                pb.set_message(doc.file_name.clone());
                pb.inc(1);
            }
            report
        })
        .collect();

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    let batch = BatchReport::new(reports);
    tracing::info!(
        documents = batch.documents.len(),
        matched = batch.matched_count(),
        unmatched = batch.unmatched_count(),
        errors = batch.error_count(),
        "batch processed"
    );
    batch
}
