//! 画面遷移コントローラ
//!
//! Home → Capture → Inspection → Result → {Label → Linked | Saved}
//!
//! - Capture → Inspection は解析成功後（ストアにドキュメントがある時）のみ
//! - Saved → Home でストアをリセットする
//! - 終端はなく、1回の起動中に何度でも検査を繰り返せる

use crate::error::{Error, Result};
use crate::store::DocumentStore;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Step {
    #[default]
    Home,
    Capture,
    Inspection,
    Result,
    Label,
    Linked,
    Saved,
}

impl Step {
    pub fn title(&self) -> &'static str {
        match self {
            Step::Home => "Home",
            Step::Capture => "Capture",
            Step::Inspection => "Inspection",
            Step::Result => "Inspection Result",
            Step::Label => "Label",
            Step::Linked => "Linked",
            Step::Saved => "Saved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// 撮影画面へ
    StartCapture,
    /// 解析APIが成功した
    AnalysisSucceeded,
    /// 解析APIが失敗した（Captureに留まる）
    AnalysisFailed,
    /// 検査結果へ（全問回答済みかは検証しない）
    ShowResult,
    /// ラベル追加
    AddLabel,
    /// ラベルとデバイスの紐付け完了
    LabelLinked,
    /// 検査を保存
    Save,
    /// 新しい検査を開始（ストアをリセット）
    StartNew,
    /// 前の画面へ戻る
    Back,
}

#[derive(Debug, Clone, Default)]
pub struct FlowController {
    step: Step,
}

impl FlowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// 遷移先を求める（状態は変更しない）
    pub fn next_step(from: Step, action: Action) -> Option<Step> {
        use Action::*;

        match (from, action) {
            (Step::Home, StartCapture) => Some(Step::Capture),
            (Step::Capture, AnalysisSucceeded) => Some(Step::Inspection),
            (Step::Capture, AnalysisFailed) => Some(Step::Capture),
            (Step::Inspection, ShowResult) => Some(Step::Result),
            (Step::Result, AddLabel) => Some(Step::Label),
            (Step::Label, LabelLinked) => Some(Step::Linked),
            (Step::Result, Save) | (Step::Linked, Save) => Some(Step::Saved),
            (Step::Saved, StartNew) => Some(Step::Home),
            (Step::Capture, Back) => Some(Step::Home),
            (Step::Inspection, Back) => Some(Step::Capture),
            (Step::Result, Back) => Some(Step::Inspection),
            (Step::Label, Back) => Some(Step::Result),
            _ => None,
        }
    }

    /// 遷移を適用する
    ///
    /// ストアに関わるガードと副作用もここで扱う:
    /// - AnalysisSucceeded: ドキュメントが無ければ `Error::NoDocument`
    /// - StartNew: ストアをリセット
    pub fn apply(&mut self, action: Action, store: &mut DocumentStore) -> Result<Step> {
        let next = Self::next_step(self.step, action).ok_or(Error::InvalidTransition {
            from: self.step,
            action,
        })?;

        match action {
            Action::AnalysisSucceeded if store.get().is_none() => return Err(Error::NoDocument),
            Action::StartNew => store.reset(),
            _ => {}
        }

        debug!(from = ?self.step, to = ?next, ?action, "flow transition");
        self.step = next;
        Ok(next)
    }
}
