//! 画像解析APIクライアント
//!
//! 撮影画像を外部AIサービスへ送り、検査計画（InspectionDocument）を受け取る。
//! サービス自体は不透明な協力者として扱う。

mod types;

pub use types::AnalyzeImageRequest;

use crate::capture::CapturedImage;
use crate::config::Config;
use crate::error::{InspectAiError, Result};
use inspect_ai_common::{parse_analysis_response, InspectionDocument};
use reqwest::header::ACCEPT;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// エラー本文として保持する最大文字数
const ERROR_BODY_LIMIT: usize = 500;

/// 画像解析の協力者
///
/// セッションはこのトレイト越しに解析を呼ぶ（テストでは差し替える）。
pub trait ImageAnalyzer: Send + Sync + 'static {
    fn analyze(
        &self,
        image: CapturedImage,
    ) -> impl Future<Output = Result<InspectionDocument>> + Send;
}

/// 解析APIのHTTPクライアント
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl AnalysisClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InspectAiError::ApiCall(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self { http, url: url.into(), timeout })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.analysis_url(), config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 画像を送信して検査ドキュメントを取得
    ///
    /// 2xx以外・通信失敗・タイムアウトはそのリクエストの失敗として返す。
    pub async fn analyze_image(&self, image: &CapturedImage) -> Result<InspectionDocument> {
        let body = AnalyzeImageRequest {
            mime_type: &image.mime_type,
            image_data_base64: &image.base64,
        };

        info!(url = %self.url, file = %image.file_name, "analysis request start");

        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;
        debug!(status = status.as_u16(), len = text.len(), "analysis response received");

        if !status.is_success() {
            return Err(InspectAiError::ApiStatus {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let doc = parse_analysis_response(&text)
            .map_err(|e| InspectAiError::ApiParse(e.to_string()))?;

        info!(session_id = %doc.session_id, items = doc.item_count(), "analysis complete");
        Ok(doc)
    }

    fn classify(&self, error: reqwest::Error) -> InspectAiError {
        if error.is_timeout() {
            InspectAiError::Timeout(self.timeout.as_secs())
        } else {
            InspectAiError::ApiCall(error.to_string())
        }
    }
}

impl ImageAnalyzer for AnalysisClient {
    fn analyze(
        &self,
        image: CapturedImage,
    ) -> impl Future<Output = Result<InspectionDocument>> + Send {
        let client = self.clone();
        async move { client.analyze_image(&image).await }
    }
}
