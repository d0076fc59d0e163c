//! 検査セッション
//!
//! ドキュメントストア・画面遷移・実行中の解析リクエストをまとめて保持する。
//!
//! - 解析リクエストは同時に1つまで（解析中の再撮影は `AnalysisInProgress`）
//! - Capture 画面から離れる（戻る・新規開始）と実行中の解析を中断する。
//!   中断後に届いたレスポンスがストアを書き換えることはない
//! - 解析失敗時はストアを変更せず Capture に留まる

use crate::analyzer::ImageAnalyzer;
use crate::capture::CapturedImage;
use crate::error::{InspectAiError, Result};
use inspect_ai_common::{
    answer_question, fallback_document, summarize, Action, Answer, DocumentStore, Error,
    FlowController, InspectionDocument, InspectionSummary, OrderKey, SectionKey, Step, YesNo,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 保存済みドキュメント上の測定済みフラグ
pub const MEASURED_FIELD: &str = "measured";

pub struct InspectionSession<A: ImageAnalyzer> {
    store: DocumentStore,
    flow: FlowController,
    analyzer: Arc<A>,
    pending: Option<JoinHandle<Result<InspectionDocument>>>,
}

impl<A: ImageAnalyzer> InspectionSession<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            store: DocumentStore::new(),
            flow: FlowController::new(),
            analyzer: Arc::new(analyzer),
            pending: None,
        }
    }

    pub fn step(&self) -> Step {
        self.flow.step()
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// 購読登録などに使う
    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn document(&self) -> Option<Arc<InspectionDocument>> {
        self.store.get()
    }

    /// 解析リクエスト実行中か（撮影ボタンの無効化に使う）
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    fn ensure_transition(&self, action: Action) -> Result<()> {
        if FlowController::next_step(self.flow.step(), action).is_none() {
            return Err(Error::InvalidTransition { from: self.flow.step(), action }.into());
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) -> Result<Step> {
        Ok(self.flow.apply(action, &mut self.store)?)
    }

    pub fn start_capture(&mut self) -> Result<Step> {
        self.apply(Action::StartCapture)
    }

    /// 解析を開始する（完了は `finish_analysis` で待つ）
    pub fn begin_analysis(&mut self, image: CapturedImage) -> Result<()> {
        self.ensure_transition(Action::AnalysisSucceeded)?;
        if self.pending.is_some() {
            return Err(InspectAiError::AnalysisInProgress);
        }

        let analyzer = Arc::clone(&self.analyzer);
        self.pending = Some(tokio::spawn(async move { analyzer.analyze(image).await }));
        Ok(())
    }

    /// 実行中の解析の完了を待ち、結果を反映する
    ///
    /// 成功: ドキュメントを置き換えて Inspection へ
    /// 失敗: ストアはそのまま、Capture に留まってエラーを返す
    pub async fn finish_analysis(&mut self) -> Result<Step> {
        // 待機中にこのFutureが破棄されても、ハンドルは残して back() で中断できるようにする
        let handle = self.pending.as_mut().ok_or(InspectAiError::NoPendingAnalysis)?;
        let joined = handle.await;
        self.pending = None;

        let outcome = match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(InspectAiError::Cancelled),
            Err(e) => Err(InspectAiError::ApiCall(format!("解析タスクが異常終了しました: {}", e))),
        };

        match outcome {
            Ok(doc) => {
                self.store.replace(doc);
                self.apply(Action::AnalysisSucceeded)
            }
            Err(e) => {
                warn!(error = %e, "analysis failed");
                self.apply(Action::AnalysisFailed)?;
                Err(e)
            }
        }
    }

    /// 解析を開始して完了まで待つ
    pub async fn analyze(&mut self, image: CapturedImage) -> Result<Step> {
        self.begin_analysis(image)?;
        self.finish_analysis().await
    }

    /// 実行中の解析を中断する
    pub fn cancel_analysis(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                info!("analysis cancelled");
                true
            }
            None => false,
        }
    }

    /// 同梱ドキュメントで検査を始める（オフライン・デモ）
    pub fn use_fallback(&mut self) -> Result<Step> {
        self.ensure_transition(Action::AnalysisSucceeded)?;
        if self.pending.is_some() {
            return Err(InspectAiError::AnalysisInProgress);
        }

        self.store.replace(fallback_document()?);
        self.apply(Action::AnalysisSucceeded)
    }

    /// 質問に回答する（トグル規則）
    pub fn answer(
        &mut self,
        section: SectionKey,
        order: &OrderKey,
        clicked: YesNo,
    ) -> Result<Answer> {
        Ok(answer_question(&mut self.store, section, order, clicked)?)
    }

    /// 電気安全検査を測定済みにする
    pub fn mark_measured(&mut self) -> Result<bool> {
        Ok(inspect_ai_common::mark_measured(&mut self.store)?)
    }

    pub fn summary(&self) -> Result<InspectionSummary> {
        let doc = self.store.get().ok_or(Error::NoDocument)?;
        Ok(summarize(&doc, self.store.is_measured()))
    }

    /// 検査結果へ（未回答があっても遷移できる）
    pub fn show_result(&mut self) -> Result<InspectionSummary> {
        self.apply(Action::ShowResult)?;
        self.summary()
    }

    pub fn add_label(&mut self) -> Result<Step> {
        self.apply(Action::AddLabel)
    }

    /// ラベル写真をドキュメントに紐付ける
    pub fn link_label(&mut self, label: CapturedImage) -> Result<Step> {
        self.ensure_transition(Action::LabelLinked)?;

        let mut fields = Map::new();
        fields.insert("photo_label".to_string(), Value::from(label.base64));
        fields.insert("photo_label_captured_at".to_string(), Value::from(label.captured_at));
        self.store.merge_fields(fields)?;

        self.apply(Action::LabelLinked)
    }

    /// 検査を保存（保存後のドキュメントを返す）
    ///
    /// 測定済みフラグは `measured` として拡張フィールドに記録する。
    pub fn save(&mut self) -> Result<Arc<InspectionDocument>> {
        self.ensure_transition(Action::Save)?;

        let mut fields = Map::new();
        fields.insert(MEASURED_FIELD.to_string(), Value::from(self.store.is_measured()));
        self.store.merge_fields(fields)?;

        let doc = self.store.get().ok_or(Error::NoDocument)?;
        self.apply(Action::Save)?;
        Ok(doc)
    }

    /// 新しい検査を開始（ストアをリセットして Home へ）
    pub fn start_new(&mut self) -> Result<Step> {
        self.cancel_analysis();
        self.apply(Action::StartNew)
    }

    /// 前の画面へ戻る（Capture から離れる時は解析を中断）
    pub fn back(&mut self) -> Result<Step> {
        self.ensure_transition(Action::Back)?;
        if self.flow.step() == Step::Capture {
            self.cancel_analysis();
        }
        self.apply(Action::Back)
    }
}
