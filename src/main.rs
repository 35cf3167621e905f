use clap::Parser;
use sku_recon::{catalog, cli, config, error, export, pipeline, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::{Result, SkuReconError};
use sku_recon_common::Normalizer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Resolve { catalog, names } => {
            let catalog_path = catalog_path(catalog, &config)?;
            let entries = catalog::load(&catalog_path)?;
            let matcher = config.engine.build_matcher(&entries)?;

            for name in &names {
                let result = matcher.resolve(name);
                let line = serde_json::json!({ "input": name, "result": result });
                println!("{}", serde_json::to_string(&line)?);
            }
        }

        Commands::Aggregate { catalog, input, output, format, title } => {
            println!("📦 sku-recon - SKU集計\n");

            // 1. マスタ読み込み
            println!("[1/3] マスタを読み込み中...");
            let catalog_path = catalog_path(catalog, &config)?;
            let entries = catalog::load(&catalog_path)?;
            let matcher = config.engine.build_shared_matcher(&entries)?;
            let aggregator = config.engine.build_aggregator()?;
            println!("✔ {}件の商品を登録\n", matcher.load().index().len());

            // 2. 照合・集計
            println!("[2/3] 照合・集計中...");
            let documents = scanner::collect_documents(&input)?;
            if documents.is_empty() {
                return Err(SkuReconError::FileNotFound(format!(
                    "{} にOCRドキュメントがありません",
                    input.display()
                )));
            }
            let report = pipeline::process_documents(&documents, &matcher, &aggregator, cli.verbose);
            println!(
                "✔ {}件のドキュメントを処理（SKU {} / 未照合 {} / 要確認 {}）\n",
                report.documents.len(),
                report.matched_count(),
                report.unmatched_count(),
                report.review_count()
            );
            for doc in report.documents.iter().filter(|d| !d.errors.is_empty()) {
                for err in &doc.errors {
                    println!("  ⚠ {}: {}", doc.document, err);
                }
            }

            // 3. 出力
            println!("[3/3] 結果を保存中...");
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            for path in export::export_report(&report, &format, &output_dir, &title)? {
                println!("✔ 出力: {}", path.display());
            }

            println!("\n✅ 集計完了");
        }

        Commands::Normalize { texts } => {
            let normalizer = Normalizer::new(&config.engine.normalizer)?;
            for text in &texts {
                println!("{} => {}", text, normalizer.normalize(text));
            }
        }

        Commands::Config { set_acceptance, set_review, set_suggestions, set_catalog, show } => {
            let mut config = config;

            if let Some(value) = set_acceptance {
                config.set_acceptance(value)?;
                println!("✔ 受理閾値を設定しました: {}", value);
            }
            if let Some(value) = set_review {
                config.set_review(value)?;
                println!("✔ 要確認閾値を設定しました: {}", value);
            }
            if let Some(count) = set_suggestions {
                config.set_suggestions(count)?;
                println!("✔ 候補数を設定しました: {}", count);
            }
            if let Some(path) = set_catalog {
                config.catalog = Some(path);
                config.save()?;
                println!("✔ 既定のマスタを設定しました");
            }

            if show {
                let engine = &config.engine;
                println!("設定: {}", Config::config_path()?.display());
                println!("  受理閾値: {}", engine.matcher.acceptance_threshold);
                println!("  要確認閾値: {}", engine.aggregator.review_threshold);
                println!("  候補数: {}", engine.matcher.suggestion_count);
                match engine.aggregator.ambiguity_margin {
                    Some(margin) => println!("  拮抗判定幅: {}", margin),
                    None => println!("  拮抗判定幅: 無効"),
                }
                println!("  キーワード補正: {}件", engine.matcher.keyword_penalties.len());
                println!("  翻訳語: {}件", engine.normalizer.translations.len());
                println!("  除外語: {}件", engine.normalizer.noise_words.len());
                println!(
                    "  既定マスタ: {}",
                    config
                        .catalog
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn catalog_path(arg: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    arg.or_else(|| config.catalog.clone()).ok_or_else(|| {
        SkuReconError::Config(
            "SKUマスタが指定されていません。`--catalog` か `sku-recon config --set-catalog` で指定してください".into(),
        )
    })
}
