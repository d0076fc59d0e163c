//! JWT取得API
//!
//! 検査フローの認可には使っていない（動作確認用の独立した呼び出し）。

use crate::config::JwtSettings;
use crate::error::{InspectAiError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct JwtResponse {
    jwt: String,
}

#[derive(Debug, Clone)]
pub struct JwtClient {
    http: reqwest::Client,
    settings: JwtSettings,
    timeout: Duration,
}

impl JwtClient {
    pub fn new(settings: JwtSettings, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InspectAiError::ApiCall(format!("HTTPクライアント初期化失敗: {}", e)))?;

        Ok(Self { http, settings, timeout })
    }

    pub async fn fetch_jwt(&self) -> Result<String> {
        let url = self
            .settings
            .url
            .as_deref()
            .ok_or_else(|| InspectAiError::MissingCredentials("jwt.url".into()))?;

        let mut request = self.http.get(url).header(ACCEPT, "application/json");
        if let Some(user) = &self.settings.user {
            request = request.header("X-USER-NAME", user);
        }
        if let Some(password) = &self.settings.password {
            request = request.header("X-USER-PASSWORD", password);
        }
        if let Some(authorization) = &self.settings.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                InspectAiError::Timeout(self.timeout.as_secs())
            } else {
                InspectAiError::ApiCall(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InspectAiError::ApiStatus { status: status.as_u16(), body });
        }

        let payload: JwtResponse = response
            .json()
            .await
            .map_err(|e| InspectAiError::ApiParse(format!("JWTレスポンス: {}", e)))?;

        tracing::info!("jwt fetched");
        Ok(payload.jwt)
    }
}
