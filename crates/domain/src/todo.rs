use crate::errors::TodoError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// 主キーとなるフィールド名
pub const ID_FIELD: &str = "id";
/// 作成時にサーバー側で付与するタイムスタンプのフィールド名
pub const CREATED_AT_FIELD: &str = "createdAt";

pub const ID_REQUIRED_MESSAGE: &str = "id is required in POST body";
pub const NO_FIELDS_MESSAGE: &str = "no fields to update";

/// ToDo レコード
///
/// スキーマは固定せず、呼び出し側が渡した任意のフィールドをそのまま保持する。
/// どのコンストラクタを経由しても `id` は空でない文字列であることが保証される。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TodoRecord(Map<String, Value>);

impl TodoRecord {
    /// POST ボディから新規レコードを組み立てる
    ///
    /// `createdAt` は呼び出し側の値があっても上書きする。
    pub fn create(payload: Value, created_at: DateTime<Utc>) -> Result<Self, TodoError> {
        let mut fields = match payload {
            Value::Object(map) => map,
            _ => return Err(TodoError::Validation(ID_REQUIRED_MESSAGE.to_string())),
        };

        if !has_valid_id(&fields) {
            return Err(TodoError::Validation(ID_REQUIRED_MESSAGE.to_string()));
        }

        fields.insert(
            CREATED_AT_FIELD.to_string(),
            Value::String(format_timestamp(created_at)),
        );

        Ok(Self(fields))
    }

    /// ストレージから読み出したフィールドを復元する
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, TodoError> {
        if !has_valid_id(&fields) {
            return Err(TodoError::Serialization(
                "stored item has no string id".to_string(),
            ));
        }
        Ok(Self(fields))
    }

    pub fn id(&self) -> &str {
        self.0
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn created_at(&self) -> Option<&str> {
        self.0.get(CREATED_AT_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// パッチのフィールドを上書き・追加する（言及されていないフィールドは保持）
    pub fn apply(&mut self, patch: &TodoPatch) {
        for (name, value) in patch.fields() {
            self.0.insert(name.clone(), value.clone());
        }
    }
}

/// PUT/PATCH で適用するフィールド集合
#[derive(Debug, Clone, PartialEq)]
pub struct TodoPatch(Map<String, Value>);

impl TodoPatch {
    /// リクエストボディからパッチを作成する
    ///
    /// `id` と `createdAt` は不変なので集合から除外する。
    /// オブジェクト以外のボディはフィールド 0 件として扱う。
    pub fn from_payload(payload: Value) -> Result<Self, TodoError> {
        let mut fields = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.remove(ID_FIELD);
        fields.remove(CREATED_AT_FIELD);

        if fields.is_empty() {
            return Err(TodoError::Validation(NO_FIELDS_MESSAGE.to_string()));
        }

        Ok(Self(fields))
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn has_valid_id(fields: &Map<String, Value>) -> bool {
    matches!(fields.get(ID_FIELD), Some(Value::String(id)) if !id.is_empty())
}

/// ISO-8601（UTC・ミリ秒・`Z` サフィックス）
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 15, 30).unwrap()
    }

    #[test]
    fn test_create_stamps_created_at() {
        let record =
            TodoRecord::create(json!({"id": "1", "title": "Buy milk"}), fixed_time()).unwrap();

        assert_eq!(record.id(), "1");
        assert_eq!(record.get("title"), Some(&json!("Buy milk")));
        assert_eq!(record.created_at(), Some("2026-10-19T08:15:30.000Z"));
    }

    #[test]
    fn test_create_overwrites_caller_created_at() {
        let record = TodoRecord::create(
            json!({"id": "1", "createdAt": "1999-01-01T00:00:00.000Z"}),
            fixed_time(),
        )
        .unwrap();

        assert_eq!(record.created_at(), Some("2026-10-19T08:15:30.000Z"));
    }

    #[test]
    fn test_create_requires_id() {
        for payload in [
            json!({}),
            json!({"title": "no id"}),
            json!({"id": ""}),
            json!({"id": null}),
            json!({"id": 42}),
            json!(["id"]),
        ] {
            let err = TodoRecord::create(payload.clone(), fixed_time()).unwrap_err();
            assert_eq!(
                err,
                TodoError::Validation(ID_REQUIRED_MESSAGE.to_string()),
                "payload: {payload}"
            );
        }
    }

    #[test]
    fn test_from_fields_rejects_item_without_id() {
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("orphan"));

        let result = TodoRecord::from_fields(fields);
        assert!(matches!(result, Err(TodoError::Serialization(_))));
    }

    #[test]
    fn test_patch_strips_immutable_fields() {
        let patch = TodoPatch::from_payload(json!({
            "id": "other",
            "createdAt": "2000-01-01T00:00:00.000Z",
            "completed": true
        }))
        .unwrap();

        assert_eq!(patch.len(), 1);
        assert_eq!(patch.fields().get("completed"), Some(&json!(true)));
    }

    #[test]
    fn test_patch_requires_at_least_one_field() {
        for payload in [json!({}), json!({"id": "1"}), json!(null), json!([1, 2])] {
            let err = TodoPatch::from_payload(payload).unwrap_err();
            assert_eq!(err, TodoError::Validation(NO_FIELDS_MESSAGE.to_string()));
        }
    }

    #[test]
    fn test_apply_is_partial_and_idempotent() {
        let mut record =
            TodoRecord::create(json!({"id": "1", "title": "Buy milk"}), fixed_time()).unwrap();
        let patch = TodoPatch::from_payload(json!({"completed": true})).unwrap();

        record.apply(&patch);
        let once = record.clone();
        record.apply(&patch);

        assert_eq!(record, once);
        assert_eq!(record.get("title"), Some(&json!("Buy milk")));
        assert_eq!(record.get("completed"), Some(&json!(true)));
        assert_eq!(record.id(), "1");
    }

    #[test]
    fn test_record_serializes_as_plain_object() {
        let record = TodoRecord::create(json!({"id": "1"}), fixed_time()).unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(
            value,
            json!({"id": "1", "createdAt": "2026-10-19T08:15:30.000Z"})
        );
    }
}
