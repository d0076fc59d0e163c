//! 検査ドキュメントの型定義
//!
//! 解析APIのレスポンス（snake_case JSON）をそのまま受ける:
//! - InspectionDocument: 1検査セッション分のルート
//! - TestSection / InspectionItem: 目視・電気・機能の各検査項目
//! - Answer: 利用者の回答（yes / no / 未回答）

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// `null` を既定値として受ける
///
/// 解析APIは読み取れなかった値（銘板のシリアル番号など）を `null` で返す。
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 回答ボタン（押されたボタン）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

/// 検査項目の回答状態
///
/// JSONでは `"yes"` / `"no"` / `null` として表現する。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<YesNo>", into = "Option<YesNo>")]
pub enum Answer {
    Yes,
    No,
    #[default]
    Unanswered,
}

impl From<YesNo> for Answer {
    fn from(value: YesNo) -> Self {
        match value {
            YesNo::Yes => Answer::Yes,
            YesNo::No => Answer::No,
        }
    }
}

impl From<Option<YesNo>> for Answer {
    fn from(value: Option<YesNo>) -> Self {
        value.map(Answer::from).unwrap_or(Answer::Unanswered)
    }
}

impl From<Answer> for Option<YesNo> {
    fn from(value: Answer) -> Self {
        match value {
            Answer::Yes => Some(YesNo::Yes),
            Answer::No => Some(YesNo::No),
            Answer::Unanswered => None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "yes"),
            Answer::No => write!(f, "no"),
            Answer::Unanswered => write!(f, "-"),
        }
    }
}

/// 検査区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Visual,
    Electrical,
    Functional,
}

impl SectionKey {
    pub const ALL: [SectionKey; 3] = [
        SectionKey::Visual,
        SectionKey::Electrical,
        SectionKey::Functional,
    ];

    /// APIレスポンス上のキー
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Visual => "visual_inspection",
            SectionKey::Electrical => "electrical_inspection",
            SectionKey::Functional => "functional_inspection",
        }
    }

    /// 画面表示用の見出し
    pub fn title(&self) -> &'static str {
        match self {
            SectionKey::Visual => "Visual Inspection",
            SectionKey::Electrical => "Electrical Safety Test",
            SectionKey::Functional => "Functional Inspection",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visual" | "visual_inspection" => Ok(SectionKey::Visual),
            "electrical" | "electrical_inspection" => Ok(SectionKey::Electrical),
            "functional" | "functional_inspection" => Ok(SectionKey::Functional),
            _ => Err(format!("Unknown section: {}. Use visual, electrical, or functional", s)),
        }
    }
}

/// 実行順（数値または文字列）
///
/// セクション内で一意。検索・更新のキーとして使う。
/// 比較は型も含めた完全一致で、`1` と `"1"` は別のキー。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderKey {
    Number(i64),
    Text(String),
}

impl From<i64> for OrderKey {
    fn from(value: i64) -> Self {
        OrderKey::Number(value)
    }
}

impl From<&str> for OrderKey {
    fn from(value: &str) -> Self {
        OrderKey::Text(value.to_string())
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKey::Number(n) => write!(f, "{}", n),
            OrderKey::Text(s) => f.write_str(s),
        }
    }
}

/// 測定限界値（APIは数値・文字列の両方を返す）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Limit {
    Number(f64),
    Text(String),
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Number(n) => write!(f, "{}", n),
            Limit::Text(s) => f.write_str(s),
        }
    }
}

/// 検査項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionItem {
    pub execution_order: OrderKey,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    // 以下3つは電気安全検査のみ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limits: Option<Limit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limits: Option<Limit>,

    #[serde(default)]
    pub user_response: Answer,

    /// スキーマ外のAPIフィールド（参照規格など）
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl InspectionItem {
    pub fn new(execution_order: impl Into<OrderKey>, name: impl Into<String>) -> Self {
        Self {
            execution_order: execution_order.into(),
            name: name.into(),
            description: None,
            measure: None,
            lower_limits: None,
            upper_limits: None,
            user_response: Answer::Unanswered,
            extensions: Map::new(),
        }
    }
}

/// 検査区分ごとの項目リスト
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSection {
    /// 再描画キーのヒント（並び順の保証ではない）
    #[serde(deserialize_with = "null_as_default")]
    pub display_order: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<InspectionItem>,
}

impl TestSection {
    pub fn find(&self, order: &OrderKey) -> Option<&InspectionItem> {
        self.items.iter().find(|item| item.execution_order == *order)
    }

    pub fn find_mut(&mut self, order: &OrderKey) -> Option<&mut InspectionItem> {
        self.items.iter_mut().find(|item| item.execution_order == *order)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tests {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_inspection: Option<TestSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electrical_inspection: Option<TestSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functional_inspection: Option<TestSection>,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Tests {
    pub fn section(&self, key: SectionKey) -> Option<&TestSection> {
        match key {
            SectionKey::Visual => self.visual_inspection.as_ref(),
            SectionKey::Electrical => self.electrical_inspection.as_ref(),
            SectionKey::Functional => self.functional_inspection.as_ref(),
        }
    }

    pub fn section_mut(&mut self, key: SectionKey) -> Option<&mut TestSection> {
        match key {
            SectionKey::Visual => self.visual_inspection.as_mut(),
            SectionKey::Electrical => self.electrical_inspection.as_mut(),
            SectionKey::Functional => self.functional_inspection.as_mut(),
        }
    }

    pub fn is_empty(&self) -> bool {
        SectionKey::ALL.iter().all(|key| self.section(*key).is_none())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplianceClassification {
    #[serde(deserialize_with = "null_as_default")]
    pub protection_class: String,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalData {
    #[serde(deserialize_with = "null_as_default")]
    pub model_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub voltage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub serial_number: String,

    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

/// 検査ドキュメント（1セッションに1つ）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionDocument {
    /// 解析サービスが採番するセッションID
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub device: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub appliance_classification: ApplianceClassification,

    #[serde(default, deserialize_with = "null_as_default")]
    pub technical_data: TechnicalData,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tests: Tests,

    /// 拡張フィールド: スキーマ外のAPIフィールドと後から追加した値（photo_label等）
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl InspectionDocument {
    pub fn item(&self, section: SectionKey, order: &OrderKey) -> Option<&InspectionItem> {
        self.tests.section(section).and_then(|s| s.find(order))
    }

    /// 全項目の回答を未回答に戻す（読み込み直後の初期状態）
    pub fn clear_responses(&mut self) {
        for key in SectionKey::ALL {
            if let Some(section) = self.tests.section_mut(key) {
                for item in &mut section.items {
                    item.user_response = Answer::Unanswered;
                }
            }
        }
    }

    /// 全セクションの項目数
    pub fn item_count(&self) -> usize {
        SectionKey::ALL
            .iter()
            .filter_map(|key| self.tests.section(*key))
            .map(|s| s.items.len())
            .sum()
    }
}
