//! 解析APIレスポンスパーサー
//!
//! レスポンス本文からJSONオブジェクトを取り出し、InspectionDocument に変換する。
//! エラーペイロードはドキュメントとして扱わずエラーにする。

use crate::error::{Error, Result};
use crate::types::{InspectionDocument, SectionKey};
use serde_json::Value;
use std::collections::HashSet;

/// レスポンスからJSONオブジェクト部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初の `{` から最後の `}` まで
///
/// # Examples
/// ```
/// use inspect_ai_common::extract_json;
///
/// let response = "result: {\"session_id\": \"abc\"}";
/// assert_eq!(extract_json(response).unwrap(), "{\"session_id\": \"abc\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if end >= start {
            return Ok(&response[start..=end]);
        }
    }

    Err(Error::Parse("JSON object not found in response".into()))
}

/// 解析レスポンスをパースして新しい検査ドキュメントを作る
///
/// 全項目の回答は未回答で初期化される。
pub fn parse_analysis_response(response: &str) -> Result<InspectionDocument> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("analysis JSON parse error: {}", e)))?;

    if let Some(message) = value.get("error").filter(|_| value.get("tests").is_none()) {
        let message = message.as_str().map(str::to_string).unwrap_or_else(|| message.to_string());
        return Err(Error::Parse(format!("analysis service returned an error: {}", message)));
    }

    let mut doc: InspectionDocument = serde_json::from_value(value)
        .map_err(|e| Error::Parse(format!("inspection document schema error: {}", e)))?;

    if doc.tests.is_empty() {
        return Err(Error::Parse("analysis result contains no test sections".into()));
    }
    check_unique_orders(&doc)?;

    doc.clear_responses();
    Ok(doc)
}

/// セクション内の実行順が一意か
fn check_unique_orders(doc: &InspectionDocument) -> Result<()> {
    for key in SectionKey::ALL {
        let Some(section) = doc.tests.section(key) else {
            continue;
        };
        let mut seen = HashSet::new();
        for item in &section.items {
            if !seen.insert(&item.execution_order) {
                return Err(Error::Parse(format!(
                    "duplicate execution_order {} in {}",
                    item.execution_order, key
                )));
            }
        }
    }
    Ok(())
}
