//! セクション操作（目視・電気・機能）
//!
//! ストアとトグル規則の薄いアダプタ。目視と機能で処理の違いはない。
//! 電気安全検査だけは一方向の測定済みフラグを持つ。

use crate::error::Result;
use crate::store::DocumentStore;
use crate::toggle::toggle;
use crate::types::{Answer, InspectionItem, OrderKey, SectionKey, YesNo};

/// 質問に回答する（トグル規則を適用）
///
/// 戻り値: 更新後の回答
pub fn answer_question(
    store: &mut DocumentStore,
    section: SectionKey,
    order: &OrderKey,
    clicked: YesNo,
) -> Result<Answer> {
    let current = store
        .get()
        .and_then(|doc| doc.item(section, order).map(|item| item.user_response))
        .unwrap_or_default();

    let next = toggle(current, clicked);
    store.update_item_response(section, order, next)?;
    Ok(next)
}

/// 電気安全検査を測定済みにする（解除手段はない）
pub fn mark_measured(store: &mut DocumentStore) -> Result<bool> {
    store.mark_measured()
}

/// 電気安全検査項目の表示文言
pub fn measurement_display(item: &InspectionItem, measured: bool) -> String {
    if !measured {
        return "Not Measured".to_string();
    }

    let lower = item.lower_limits.as_ref().map(|l| l.to_string()).unwrap_or_else(|| "-".into());
    let upper = item.upper_limits.as_ref().map(|l| l.to_string()).unwrap_or_else(|| "-".into());
    let unit = item.measure.as_deref().unwrap_or("");

    format!("from {} to {} {}", lower, upper, unit).trim_end().to_string()
}
