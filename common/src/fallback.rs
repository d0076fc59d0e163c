//! オフライン（デモ）用の同梱検査ドキュメント

use crate::error::Result;
use crate::parser::parse_analysis_response;
use crate::types::InspectionDocument;

const FALLBACK_JSON: &str = include_str!("../data/fallback_inspection.json");

/// 同梱ドキュメントを読み込む（回答は全て未回答）
pub fn fallback_document() -> Result<InspectionDocument> {
    parse_analysis_response(FALLBACK_JSON)
}
