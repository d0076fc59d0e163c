//! 検査ドキュメントストア
//!
//! 現在の InspectionDocument を唯一保持し、読み書きを仲介する。
//! 変更のたびに新しい `Arc` を作って差し替えるので、購読者が
//! 更新途中のツリーを見ることはない。

use crate::error::{Error, Result};
use crate::types::{Answer, InspectionDocument, OrderKey, SectionKey};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// 変更の種類
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Replaced,
    ItemUpdated {
        section: SectionKey,
        order: OrderKey,
        answer: Answer,
    },
    FieldsMerged,
    Measured,
    Reset,
}

/// 購読者に渡す変更通知（変更後の完全なスナップショット）
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub revision: u64,
    pub change: Change,
    pub document: Option<Arc<InspectionDocument>>,
    pub measured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&StoreEvent) + Send + Sync>;

#[derive(Default)]
pub struct DocumentStore {
    current: Option<Arc<InspectionDocument>>,
    measured: bool,
    revision: u64,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のドキュメント（未読み込みなら None）
    pub fn get(&self) -> Option<Arc<InspectionDocument>> {
        self.current.clone()
    }

    /// 変更のたびに増える版番号
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// 電気安全検査の測定済みフラグ
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// ドキュメントを丸ごと置き換える（解析結果・フォールバック文書）
    pub fn replace(&mut self, doc: InspectionDocument) {
        debug!(session_id = %doc.session_id, items = doc.item_count(), "document replaced");
        self.measured = false;
        self.current = Some(Arc::new(doc));
        self.publish(Change::Replaced);
    }

    /// 1項目の回答を更新する
    ///
    /// `(section, order)` に該当する項目がなければ `Error::NotFound`。
    /// この場合ドキュメントは変更されず、通知もしない。
    pub fn update_item_response(
        &mut self,
        section: SectionKey,
        order: &OrderKey,
        answer: Answer,
    ) -> Result<()> {
        let current = self.current.as_ref().ok_or(Error::NoDocument)?;

        let mut next = InspectionDocument::clone(current);
        let item = next
            .tests
            .section_mut(section)
            .and_then(|s| s.find_mut(order))
            .ok_or_else(|| {
                warn!(%section, %order, "inspection item not found");
                Error::NotFound { section, order: order.clone() }
            })?;
        item.user_response = answer;

        debug!(%section, %order, %answer, "item response updated");
        self.current = Some(Arc::new(next));
        self.publish(Change::ItemUpdated { section, order: order.clone(), answer });
        Ok(())
    }

    /// トップレベルへ浅いマージを行う
    ///
    /// 既知のキー（`device` など）は型付きフィールドを上書きし、それ以外は
    /// 拡張フィールドに入る。型に合わない値なら `Error::Json` で、ドキュメントは変更しない。
    pub fn merge_fields(&mut self, fields: Map<String, Value>) -> Result<()> {
        let current = self.current.as_ref().ok_or(Error::NoDocument)?;

        let mut merged = match serde_json::to_value(&**current)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(fields);
        let next: InspectionDocument = serde_json::from_value(Value::Object(merged))?;

        self.current = Some(Arc::new(next));
        self.publish(Change::FieldsMerged);
        Ok(())
    }

    /// 測定済みにする（一方向。2回目以降は何もしない）
    ///
    /// 戻り値: 今回の呼び出しでフラグが立ったか
    pub fn mark_measured(&mut self) -> Result<bool> {
        if self.current.is_none() {
            return Err(Error::NoDocument);
        }
        if self.measured {
            return Ok(false);
        }

        self.measured = true;
        self.publish(Change::Measured);
        Ok(true)
    }

    /// 未読み込み状態に戻す（新しい検査の開始前）
    pub fn reset(&mut self) {
        debug!("document store reset");
        self.current = None;
        self.measured = false;
        self.publish(Change::Reset);
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn publish(&mut self, change: Change) {
        self.revision += 1;
        let event = StoreEvent {
            revision: self.revision,
            change,
            document: self.current.clone(),
            measured: self.measured,
        };
        for (_, callback) in &self.subscribers {
            callback(&event);
        }
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("current", &self.current)
            .field("measured", &self.measured)
            .field("revision", &self.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InspectionItem, TestSection};
    use std::sync::Mutex;

    fn sample_doc() -> InspectionDocument {
        let mut doc = InspectionDocument {
            session_id: "session-1".to_string(),
            device: "Hammer drill".to_string(),
            ..Default::default()
        };
        doc.tests.visual_inspection = Some(TestSection {
            display_order: 1,
            items: vec![InspectionItem::new(1, "Housing"), InspectionItem::new(2, "Labeling")],
        });
        doc
    }

    #[test]
    fn test_store_starts_empty() {
        let store = DocumentStore::new();
        assert!(store.get().is_none());
        assert_eq!(store.revision(), 0);
        assert!(!store.is_measured());
    }

    #[test]
    fn test_replace_then_get_roundtrip() {
        let mut store = DocumentStore::new();
        let doc = sample_doc();
        store.replace(doc.clone());

        assert_eq!(*store.get().unwrap(), doc);
    }

    #[test]
    fn test_update_produces_new_identity() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());
        let before = store.get().unwrap();

        store
            .update_item_response(SectionKey::Visual, &OrderKey::Number(1), Answer::Yes)
            .unwrap();
        let after = store.get().unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        // 古いスナップショットは変更されない
        assert_eq!(
            before.item(SectionKey::Visual, &OrderKey::Number(1)).unwrap().user_response,
            Answer::Unanswered
        );
        assert_eq!(
            after.item(SectionKey::Visual, &OrderKey::Number(1)).unwrap().user_response,
            Answer::Yes
        );
    }

    #[test]
    fn test_update_not_found_leaves_document() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());
        let before = store.get().unwrap();
        let revision = store.revision();

        let err = store
            .update_item_response(SectionKey::Visual, &OrderKey::Number(999), Answer::Yes)
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { section: SectionKey::Visual, .. }));
        assert!(Arc::ptr_eq(&before, &store.get().unwrap()));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_update_missing_section_is_not_found() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());

        let err = store
            .update_item_response(SectionKey::Functional, &OrderKey::Number(1), Answer::No)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { section: SectionKey::Functional, .. }));
    }

    #[test]
    fn test_update_without_document() {
        let mut store = DocumentStore::new();
        let err = store
            .update_item_response(SectionKey::Visual, &OrderKey::Number(1), Answer::Yes)
            .unwrap_err();
        assert!(matches!(err, Error::NoDocument));
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut once = DocumentStore::new();
        once.replace(sample_doc());
        once.update_item_response(SectionKey::Visual, &OrderKey::Number(2), Answer::No).unwrap();

        let mut twice = DocumentStore::new();
        twice.replace(sample_doc());
        twice.update_item_response(SectionKey::Visual, &OrderKey::Number(2), Answer::No).unwrap();
        twice.update_item_response(SectionKey::Visual, &OrderKey::Number(2), Answer::No).unwrap();

        assert_eq!(*once.get().unwrap(), *twice.get().unwrap());
    }

    #[test]
    fn test_merge_fields() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());

        let mut fields = Map::new();
        fields.insert("photo_label".to_string(), Value::from("base64data"));
        store.merge_fields(fields).unwrap();

        let doc = store.get().unwrap();
        assert_eq!(doc.extensions.get("photo_label"), Some(&Value::from("base64data")));
        assert_eq!(doc.session_id, "session-1");
    }

    #[test]
    fn test_merge_known_field_overwrites_typed_value() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());
        store
            .update_item_response(SectionKey::Visual, &OrderKey::Number(1), Answer::No)
            .unwrap();

        let mut fields = Map::new();
        fields.insert("device".to_string(), Value::from("Grinder"));
        store.merge_fields(fields).unwrap();

        let doc = store.get().unwrap();
        assert_eq!(doc.device, "Grinder");
        assert!(!doc.extensions.contains_key("device"));
        // 回答はマージ後も残る
        assert_eq!(
            doc.item(SectionKey::Visual, &OrderKey::Number(1)).unwrap().user_response,
            Answer::No
        );

        let json = serde_json::to_string(&*doc).unwrap();
        assert_eq!(json.matches("\"device\"").count(), 1);
    }

    #[test]
    fn test_merge_rejects_mistyped_known_field() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());
        let before = store.get().unwrap();
        let revision = store.revision();

        let mut fields = Map::new();
        fields.insert("session_id".to_string(), Value::from(42));
        let err = store.merge_fields(fields).unwrap_err();

        assert!(matches!(err, Error::Json(_)));
        assert!(Arc::ptr_eq(&before, &store.get().unwrap()));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_mark_measured_once() {
        let mut store = DocumentStore::new();
        assert!(matches!(store.mark_measured(), Err(Error::NoDocument)));

        store.replace(sample_doc());
        assert!(store.mark_measured().unwrap());
        let revision = store.revision();
        assert!(!store.mark_measured().unwrap());
        assert!(store.is_measured());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_replace_clears_measured() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());
        store.mark_measured().unwrap();

        store.replace(sample_doc());
        assert!(!store.is_measured());
    }

    #[test]
    fn test_reset() {
        let mut store = DocumentStore::new();
        store.replace(sample_doc());
        store.mark_measured().unwrap();
        store.reset();

        assert!(store.get().is_none());
        assert!(!store.is_measured());
    }

    #[test]
    fn test_subscribers_receive_complete_snapshots() {
        let mut store = DocumentStore::new();
        let seen: Arc<Mutex<Vec<(u64, Change, Option<Answer>)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        store.subscribe(move |event| {
            let answer = event
                .document
                .as_ref()
                .and_then(|d| d.item(SectionKey::Visual, &OrderKey::Number(1)))
                .map(|i| i.user_response);
            sink.lock().unwrap().push((event.revision, event.change.clone(), answer));
        });

        store.replace(sample_doc());
        store.update_item_response(SectionKey::Visual, &OrderKey::Number(1), Answer::Yes).unwrap();
        store.reset();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], (1, Change::Replaced, Some(Answer::Unanswered)));
        assert_eq!(seen[1].0, 2);
        assert_eq!(seen[1].2, Some(Answer::Yes));
        assert_eq!(seen[2], (3, Change::Reset, None));
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = DocumentStore::new();
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);
        let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.replace(sample_doc());
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.reset();

        assert_eq!(*count.lock().unwrap(), 1);
    }
}
