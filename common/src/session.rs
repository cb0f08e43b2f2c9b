//! 画面遷移と読み込み表示
//!
//! HOME → LOADING → RESULT → HOME、LOADING 失敗時は HOME（エラー付き）。
//! MAP は HOME からのみ開き、HOME に戻る

use crate::error::{Error, Result};
use crate::prompts::{ANALYSIS_FAILED_MESSAGE, LOADING_MESSAGES};
use crate::types::{AnalysisResult, GeoLocation};

/// 画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Loading,
    Result,
    Map,
}

/// 1セッションの表示状態
#[derive(Debug, Clone)]
pub struct Session {
    view: View,
    result: Option<AnalysisResult>,
    error: Option<String>,
    current_location: Option<GeoLocation>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            view: View::Home,
            result: None,
            error: None,
            current_location: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current_location(&self) -> Option<&GeoLocation> {
        self.current_location.as_ref()
    }

    fn expect_view(&self, expected: View, event: &str) -> Result<()> {
        if self.view == expected {
            Ok(())
        } else {
            Err(Error::InvalidTransition(format!("{:?} -> {}", self.view, event)))
        }
    }

    /// 画像選択: HOME → LOADING（前回の結果・エラーは破棄）
    pub fn select_image(&mut self) -> Result<()> {
        self.expect_view(View::Home, "select_image")?;
        self.view = View::Loading;
        self.result = None;
        self.error = None;
        self.current_location = None;
        Ok(())
    }

    /// 解析中に解決した位置を表示用に保持
    pub fn set_location(&mut self, location: GeoLocation) {
        if self.view == View::Loading {
            self.current_location = Some(location);
        }
    }

    /// 解析成功: LOADING → RESULT
    pub fn succeed(&mut self, result: AnalysisResult) -> Result<()> {
        self.expect_view(View::Loading, "succeed")?;
        self.view = View::Result;
        self.result = Some(result);
        Ok(())
    }

    /// 解析失敗: LOADING → HOME（エラー付き、部分結果は保持しない）
    pub fn fail(&mut self) -> Result<()> {
        self.expect_view(View::Loading, "fail")?;
        self.view = View::Home;
        self.result = None;
        self.error = Some(ANALYSIS_FAILED_MESSAGE.to_string());
        Ok(())
    }

    /// リセット: 任意の画面 → HOME
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// HOME → MAP
    pub fn open_map(&mut self) -> Result<()> {
        self.expect_view(View::Home, "open_map")?;
        self.view = View::Map;
        Ok(())
    }

    /// MAP → HOME
    pub fn close_map(&mut self) -> Result<()> {
        self.expect_view(View::Map, "close_map")?;
        self.view = View::Home;
        Ok(())
    }
}

/// 読み込み中メッセージの送り
///
/// 1ティックごとに1つ進み、最後のメッセージで止まる
#[derive(Debug, Clone)]
pub struct LoadingTicker {
    messages: &'static [&'static str],
    index: usize,
}

impl Default for LoadingTicker {
    fn default() -> Self {
        Self::new(LOADING_MESSAGES)
    }
}

impl LoadingTicker {
    pub fn new(messages: &'static [&'static str]) -> Self {
        Self { messages, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'static str {
        self.messages.get(self.index).copied().unwrap_or("")
    }

    /// 次へ進めて現在のメッセージを返す
    pub fn tick(&mut self) -> &'static str {
        if self.index + 1 < self.messages.len() {
            self.index += 1;
        }
        self.current()
    }
}
