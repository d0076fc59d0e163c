use crate::error::{InspectAiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ANALYSIS_URL: &str = "https://radon.ironapi.com/v1/plugins/ai_analyze_image";

/// JWT取得APIの接続情報
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis_url: String,
    pub timeout_seconds: u64,
    pub max_image_size: u32,
    pub jpeg_quality: u8,
    pub jwt: JwtSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis_url: DEFAULT_ANALYSIS_URL.into(),
            timeout_seconds: 30,
            max_image_size: 1568,
            jpeg_quality: 85,
            jwt: JwtSettings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| InspectAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("inspect-ai").join("config.json"))
    }

    /// 解析APIのURL（環境変数を優先）
    pub fn analysis_url(&self) -> String {
        std::env::var("INSPECT_AI_ANALYSIS_URL").unwrap_or_else(|_| self.analysis_url.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// JWT接続情報（環境変数を優先）
    ///
    /// URLが未設定なら `MissingCredentials`
    pub fn jwt_settings(&self) -> Result<JwtSettings> {
        let env = |name: &str, fallback: &Option<String>| {
            std::env::var(name).ok().or_else(|| fallback.clone())
        };

        let settings = JwtSettings {
            url: env("INSPECT_AI_JWT_URL", &self.jwt.url),
            user: env("INSPECT_AI_USER", &self.jwt.user),
            password: env("INSPECT_AI_PASSWORD", &self.jwt.password),
            authorization: env("INSPECT_AI_AUTHORIZATION", &self.jwt.authorization),
        };

        if settings.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(InspectAiError::MissingCredentials("jwt.url".into()));
        }
        Ok(settings)
    }

    pub fn set_analysis_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(InspectAiError::Config(format!("URLが不正です: {}", url)));
        }
        self.analysis_url = url;
        Ok(())
    }
}
