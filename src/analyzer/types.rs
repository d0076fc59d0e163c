use serde::Serialize;

/// 解析APIリクエスト本文
#[derive(Debug, Serialize)]
pub struct AnalyzeImageRequest<'a> {
    pub mime_type: &'a str,
    pub image_data_base64: &'a str,
}
