use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("JWT認証情報が設定されていません: {0}。`inspect-ai config --show` で確認してください")]
    MissingCredentials(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("写真へのアクセスが拒否されました: {0}")]
    PermissionDenied(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIがエラーを返しました (HTTP {status}): {body}")]
    ApiStatus { status: u16, body: String },

    #[error("API呼び出しがタイムアウトしました ({0}秒)。もう一度撮影してください")]
    Timeout(u64),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("解析中です。完了までお待ちください")]
    AnalysisInProgress,

    #[error("解析はキャンセルされました")]
    Cancelled,

    #[error("解析は開始されていません")]
    NoPendingAnalysis,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] inspect_ai_common::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

impl InspectAiError {
    /// 解析API系のエラー（ユーザー操作で再試行できる）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InspectAiError::ApiCall(_)
                | InspectAiError::ApiStatus { .. }
                | InspectAiError::Timeout(_)
                | InspectAiError::ApiParse(_)
                | InspectAiError::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, InspectAiError>;
