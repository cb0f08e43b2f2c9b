use crate::config::LocatorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coffee-ai")]
#[command(about = "コーヒー樹AI診断・地域ヘルスマップツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像（またはフォルダ内の画像）を診断
    Analyze {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// その場で撮影した画像として扱う（タグを読まない）
        #[arg(long)]
        camera: bool,

        /// 端末位置の緯度 (-90〜90)
        #[arg(long, requires = "lng", allow_hyphen_values = true, value_parser = parse_latitude)]
        lat: Option<f64>,

        /// 端末位置の経度 (-180〜180)
        #[arg(long, requires = "lat", allow_hyphen_values = true, value_parser = parse_longitude)]
        lng: Option<f64>,

        /// 端末位置の取得方法（省略時は設定ファイル）
        #[arg(long, value_enum)]
        locator: Option<LocatorKind>,

        /// 履歴に保存しない
        #[arg(long)]
        no_save: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,

        /// 結果JSONの保存先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 診断履歴を表示
    History {
        /// 表示件数
        #[arg(short, long)]
        limit: Option<usize>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 地域ヘルスマップ（グリッド集計）
    Map {
        /// 集計期間（日）
        #[arg(short, long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=90))]
        days: u32,

        /// GeoJSONの出力先
        #[arg(long)]
        geojson: Option<PathBuf>,
    },

    /// 対話モード
    Interactive,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// モデル名を設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

fn parse_coordinate(s: &str, limit: f64, name: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{}が数値ではありません: {}", name, s))?;
    if (-limit..=limit).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{}は -{}〜{} の範囲で指定してください: {}", name, limit, limit, s))
    }
}

fn parse_latitude(s: &str) -> Result<f64, String> {
    parse_coordinate(s, 90.0, "緯度")
}

fn parse_longitude(s: &str) -> Result<f64, String> {
    parse_coordinate(s, 180.0, "経度")
}
