use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkuReconError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("マスタファイルが不正: {0}")]
    InvalidCatalog(String),

    #[error("OCRドキュメントが不正: {0}")]
    InvalidDocument(String),

    #[error("スプレッドシート読み込みエラー: {0}")]
    Spreadsheet(String),

    #[error("出力エラー: {0}")]
    Export(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] sku_recon_common::Error),
}

impl From<calamine::Error> for SkuReconError {
    fn from(e: calamine::Error) -> Self {
        SkuReconError::Spreadsheet(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SkuReconError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        SkuReconError::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SkuReconError>;
