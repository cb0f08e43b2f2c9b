//! 解析中のスピナー表示
//!
//! 1秒ごとにメッセージを1つ進め、最後のメッセージで止まる。処理が終わったら消す

use coffee_ai_common::LoadingTicker;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// メッセージを進める間隔
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// `future` の完了までスピナーを表示
pub async fn with_loading<F: Future>(future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));

    let output = drive(future, TICK_INTERVAL, |msg| spinner.set_message(msg)).await;

    spinner.finish_and_clear();
    output
}

/// `future` を待ちながら `interval` ごとに表示メッセージを更新
pub async fn drive<F, M>(future: F, interval: Duration, mut show: M) -> F::Output
where
    F: Future,
    M: FnMut(&'static str),
{
    let mut ticker = LoadingTicker::default();
    show(ticker.current());

    let mut timer = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    tokio::pin!(future);

    loop {
        tokio::select! {
            output = &mut future => return output,
            _ = timer.tick() => show(ticker.tick()),
        }
    }
}
