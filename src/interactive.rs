//! 対話モード
//!
//! HOME / 解析中 / 結果 / 地図 の画面遷移をメニューで操作する

use crate::analyzer::Diagnoser;
use crate::error::{CoffeeAiError, Result};
use crate::history::HistoryStore;
use crate::locator::DeviceLocator;
use crate::pipeline::{analyze_image, AnalyzeOptions};
use crate::progress::with_loading;
use crate::report::{format_dashboard, MapView};
use coffee_ai_common::grid::{clamp_days, DEFAULT_DAYS};
use coffee_ai_common::{CaptureSource, Session, View};
use dialoguer::{Input, Select};
use std::path::PathBuf;

/// HOME のメニュー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAction {
    Upload,
    Camera,
    Map,
    Quit,
}

impl HomeAction {
    pub const ALL: [HomeAction; 4] = [
        HomeAction::Upload,
        HomeAction::Camera,
        HomeAction::Map,
        HomeAction::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HomeAction::Upload => "画像ファイルを診断",
            HomeAction::Camera => "撮影した画像を診断（タグを読まない）",
            HomeAction::Map => "地域ヘルスマップ",
            HomeAction::Quit => "終了",
        }
    }
}

/// メニューを出す画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Result,
    Map,
}

/// 解析中の状態は with_loading の中で抜けるので HOME と同じ扱い
fn screen_for(view: View) -> Screen {
    match view {
        View::Home | View::Loading => Screen::Home,
        View::Result => Screen::Result,
        View::Map => Screen::Map,
    }
}

/// 期間入力を日数に変換（空なら既定値、範囲外は丸める）
pub fn parse_days_input(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(DEFAULT_DAYS);
    }
    trimmed.parse::<u32>().ok().map(clamp_days)
}

fn prompt_err(e: dialoguer::Error) -> CoffeeAiError {
    CoffeeAiError::Prompt(e.to_string())
}

fn select_home() -> Result<HomeAction> {
    let labels: Vec<&str> = HomeAction::ALL.iter().map(|a| a.label()).collect();
    let index = Select::new()
        .with_prompt("操作を選択")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(HomeAction::ALL[index])
}

/// 対話モードを実行
pub async fn run_interactive<D, L, S>(
    diagnoser: &D,
    locator: &L,
    store: &mut S,
    options: &AnalyzeOptions,
    now_ms: impl Fn() -> i64,
) -> Result<()>
where
    D: Diagnoser,
    L: DeviceLocator,
    S: HistoryStore,
{
    let mut session = Session::new();
    println!("☕ coffee-ai - 対話モード\n");

    loop {
        match screen_for(session.view()) {
            Screen::Home => {
                if let Some(message) = session.error() {
                    println!("⚠ {}\n", message);
                }
                session.dismiss_error();

                let action = select_home()?;
                match action {
                    HomeAction::Upload | HomeAction::Camera => {
                        let path: String = Input::new()
                            .with_prompt("画像のパス")
                            .interact_text()
                            .map_err(prompt_err)?;
                        let source = if action == HomeAction::Camera {
                            CaptureSource::Camera
                        } else {
                            CaptureSource::Upload
                        };
                        let opts = AnalyzeOptions {
                            source,
                            ..options.clone()
                        };
                        let path = PathBuf::from(path.trim());

                        let outcome = with_loading(analyze_image(
                            &mut session,
                            &path,
                            &opts,
                            diagnoser,
                            locator,
                            store,
                        ))
                        .await;

                        if let Ok(outcome) = outcome {
                            println!("\n{}\n", format_dashboard(&outcome.record, outcome.location_source));
                            if let Some(warning) = outcome.warning {
                                println!("⚠ 履歴に保存できませんでした: {}\n", warning);
                            }
                        }
                    }
                    HomeAction::Map => session.open_map()?,
                    HomeAction::Quit => break,
                }
            }
            Screen::Result => {
                let choice = Select::new()
                    .items(&["新しい診断", "終了"])
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;
                if choice == 1 {
                    break;
                }
                session.reset();
            }
            Screen::Map => {
                let input: String = Input::new()
                    .with_prompt(format!("期間（日, 1-90）[{}]", DEFAULT_DAYS))
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_err)?;
                match parse_days_input(&input) {
                    Some(days) => {
                        let records = store.list()?;
                        let view = MapView::build(&records, days, now_ms());
                        println!("\n{}\n", view.summary());
                    }
                    None => println!("数値を入力してください\n"),
                }
                session.close_map()?;
            }
        }
    }

    println!("終了します");
    Ok(())
}
