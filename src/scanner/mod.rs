use crate::error::{Result, SkuReconError};
use serde::Deserialize;
use sku_recon_common::OcrLine;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub file_name: String,
}

impl DocumentInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

const DOCUMENT_EXTENSION: &str = "json";

/// フォルダ直下のOCRドキュメント（*.json）を列挙
pub fn scan_folder(folder: &Path) -> Result<Vec<DocumentInfo>> {
    if !folder.is_dir() {
        return Err(SkuReconError::FolderNotFound(folder.display().to_string()));
    }

    let mut documents: Vec<DocumentInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_document(e.path()))
        .map(|e| DocumentInfo::from_path(e.path()))
        .collect();

    // ファイル名でソート
    documents.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(documents)
}

/// ファイルならその1件、フォルダなら直下のドキュメント一覧
pub fn collect_documents(input: &Path) -> Result<Vec<DocumentInfo>> {
    if input.is_file() {
        Ok(vec![DocumentInfo::from_path(input)])
    } else if input.is_dir() {
        scan_folder(input)
    } else {
        Err(SkuReconError::FileNotFound(input.display().to_string()))
    }
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        .unwrap_or(false)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentBody {
    Lines(Vec<OcrLine>),
    Wrapped { products: Vec<OcrLine> },
}

/// OCRドキュメントを読み込む
///
/// 行の配列、または `{"products": [...]}` を受け付ける。
pub fn load_document(path: &Path) -> Result<Vec<OcrLine>> {
    if !path.exists() {
        return Err(SkuReconError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_document(&content)
        .map_err(|e| SkuReconError::InvalidDocument(format!("{}: {}", path.display(), e)))
}

pub fn parse_document(content: &str) -> std::result::Result<Vec<OcrLine>, serde_json::Error> {
    Ok(match serde_json::from_str::<DocumentBody>(content)? {
        DocumentBody::Lines(lines) => lines,
        DocumentBody::Wrapped { products } => products,
    })
}
