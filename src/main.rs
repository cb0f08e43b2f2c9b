use clap::Parser;
use coffee_ai::{analyzer, cli, config, error, history, interactive, locator, pipeline, progress, report, scanner};
use coffee_ai_common::{CaptureSource, GeoLocation, HistoryRecord, Session, ANALYSIS_FAILED_MESSAGE};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use history::{HistoryStore, JsonFileStore};
use std::env;
use std::io::IsTerminal;
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { path, camera, lat, lng, locator: locator_kind, no_save, json, output } => {
            let mut config = config;
            if let Some(kind) = locator_kind {
                config.locator = kind;
            }
            if !json {
                println!("☕ coffee-ai - 画像診断\n");
            }

            let images = scanner::collect_images(&path)?;
            let diagnoser = analyzer::GeminiClient::from_config(&config)?;
            let position = lat.zip(lng).map(|(lat, lng)| GeoLocation::new(lat, lng));
            let locator = locator::Locator::from_config(&config, position);
            let mut store = open_store(&config)?;

            let source = if camera { CaptureSource::Camera } else { CaptureSource::Upload };
            let options = pipeline::AnalyzeOptions::from_config(&config, source, !no_save);

            let mut records: Vec<HistoryRecord> = Vec::new();
            let mut last_error = None;

            // 1枚ずつ順番に解析
            for (i, image) in images.iter().enumerate() {
                if !json {
                    println!("[{}/{}] {}", i + 1, images.len(), image.file_name);
                }

                let mut session = Session::new();
                let outcome = progress::with_loading(pipeline::analyze_image(
                    &mut session,
                    &image.path,
                    &options,
                    &diagnoser,
                    &locator,
                    &mut store,
                ))
                .await;

                match outcome {
                    Ok(outcome) => {
                        if !json {
                            println!("{}\n", report::format_dashboard(&outcome.record, outcome.location_source));
                            if let Some(warning) = &outcome.warning {
                                println!("⚠ 履歴に保存できませんでした: {}\n", warning);
                            }
                        }
                        records.push(outcome.record);
                    }
                    Err(e) => {
                        if !json {
                            println!("✖ {}\n", session.error().unwrap_or(ANALYSIS_FAILED_MESSAGE));
                        }
                        last_error = Some(e);
                    }
                }
            }

            if records.is_empty() {
                if let Some(e) = last_error {
                    return Err(e);
                }
            }

            let content = serde_json::to_string_pretty(&records)?;
            if json {
                println!("{}", content);
            }
            if let Some(output) = output {
                std::fs::write(&output, &content)?;
                if !json {
                    println!("✔ 結果を保存: {}", output.display());
                }
            }

            if !json {
                println!("✅ 診断完了 ({}/{}枚)", records.len(), images.len());
            }
        }

        Commands::History { limit, json } => {
            let store = open_store(&config)?;
            let records = store.list()?;

            if json {
                let shown = limit.unwrap_or(records.len()).min(records.len());
                println!("{}", serde_json::to_string_pretty(&records[..shown])?);
            } else {
                println!("📋 診断履歴\n");
                println!("{}", report::format_history(&records, limit));
            }
        }

        Commands::Map { days, geojson } => {
            let store = open_store(&config)?;
            let records = store.list()?;
            let view = report::MapView::build(&records, days, chrono::Utc::now().timestamp_millis());

            println!("{}", view.summary());

            if let Some(path) = geojson {
                let content = serde_json::to_string_pretty(&view.to_geojson())?;
                std::fs::write(&path, content)?;
                println!("✔ GeoJSONを保存: {}", path.display());
            }
        }

        Commands::Interactive => {
            let diagnoser = analyzer::GeminiClient::from_config(&config)?;
            let locator = locator::Locator::from_config(&config, None);
            let mut store = open_store(&config)?;
            let options = pipeline::AnalyzeOptions::from_config(&config, CaptureSource::Upload, true);

            interactive::run_interactive(&diagnoser, &locator, &mut store, &options, || {
                chrono::Utc::now().timestamp_millis()
            })
            .await?;
        }

        Commands::Config { set_api_key, set_model, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(model) = set_model {
                config.set_model(model)?;
                println!("✔ モデルを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  APIエンドポイント: {}", config.api_base_url);
                println!("  温度: {}", config.temperature);
                println!("  履歴: {}", config.history_path()?.display());
                println!("  履歴上限: {}件", history::HISTORY_CAPACITY);
                println!("  サムネイル: {}px", config.thumbnail_size);
                println!("  位置取得: {:?} (タイムアウト {}秒)", config.locator, locator::LOCATION_TIMEOUT.as_secs());
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> Result<JsonFileStore> {
    Ok(JsonFileStore::new(config.history_path()?))
}

/// ログ出力を初期化（標準エラーへ）
///
/// `RUST_LOG` があればそれを使い、なければ `COFFEE_AI_LOG_LEVEL`、
/// どちらも無ければ warn（`--verbose` なら debug）
fn init_tracing(verbose: bool) {
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("COFFEE_AI_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ if verbose => "debug",
            _ => "warn",
        };
        EnvFilter::new(format!("{level},hyper=warn,reqwest=warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_env_filter(env_filter)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .init();
}
