use crate::error::{Result, SkuReconError};
use serde::{Deserialize, Serialize};
use sku_recon_common::EngineConfig;
use std::path::PathBuf;

/// 受理閾値を上書きする環境変数
pub const ENV_ACCEPTANCE: &str = "FUZZY_MATCH_THRESHOLD";
/// 要確認閾値を上書きする環境変数
pub const ENV_REVIEW: &str = "CONFIDENCE_WARNING";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    /// 既定のマスタファイル
    pub catalog: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };
        config.apply_env()?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.engine.validate()?;
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SkuReconError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("sku-recon").join("config.json"))
    }

    /// 環境変数で閾値を上書き
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(ENV_ACCEPTANCE).ok().as_deref(),
            std::env::var(ENV_REVIEW).ok().as_deref(),
        )
    }

    fn apply_overrides(&mut self, acceptance: Option<&str>, review: Option<&str>) -> Result<()> {
        if let Some(value) = acceptance {
            self.engine.matcher.acceptance_threshold = parse_threshold(ENV_ACCEPTANCE, value)?;
        }
        if let Some(value) = review {
            self.engine.aggregator.review_threshold = parse_threshold(ENV_REVIEW, value)?;
        }
        Ok(())
    }

    pub fn set_acceptance(&mut self, value: f64) -> Result<()> {
        self.engine.matcher.acceptance_threshold = value;
        self.save()
    }

    pub fn set_review(&mut self, value: f64) -> Result<()> {
        self.engine.aggregator.review_threshold = value;
        self.save()
    }

    pub fn set_suggestions(&mut self, count: usize) -> Result<()> {
        self.engine.matcher.suggestion_count = count;
        self.save()
    }
}

fn parse_threshold(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SkuReconError::Config(format!("{} の値が数値ではありません: {}", name, value)))
}
