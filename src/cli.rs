use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sku-recon")]
#[command(about = "OCR販売レポートの商品名をSKUマスタと照合・集計するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 商品名をSKUに照合してJSONを出力
    Resolve {
        /// SKUマスタ（json/csv/xlsx）。省略時は設定ファイルの値
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 照合する商品名
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// OCRドキュメントをSKU別に集計
    Aggregate {
        /// SKUマスタ（json/csv/xlsx）。省略時は設定ファイルの値
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// OCRドキュメント（JSON）またはフォルダ
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル/ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (json/excel/both)
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// 出力ファイル名（拡張子なし）
        #[arg(short, long, default_value = "sku_report")]
        title: String,
    },

    /// 商品名の正規化結果を表示
    Normalize {
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// 設定を表示/編集
    Config {
        /// 受理閾値を設定 (0.0-1.0)
        #[arg(long)]
        set_acceptance: Option<f64>,

        /// 要確認閾値を設定 (0.0-1.0)
        #[arg(long)]
        set_review: Option<f64>,

        /// 候補数を設定
        #[arg(long)]
        set_suggestions: Option<usize>,

        /// 既定のSKUマスタを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use json, excel, or both", s)),
        }
    }
}
