use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::{TodoError, TodoPatch, TodoRecord, ID_FIELD};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// DynamoDB のアイテム表現
pub type Item = HashMap<String, AttributeValue>;

/// 条件式で主キーを参照するためのプレースホルダー
pub const ID_NAME_PLACEHOLDER: &str = "#id";

/// JSON 値を DynamoDB AttributeValue に変換
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(name, v)| (name.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

/// DynamoDB AttributeValue を JSON 値に変換
///
/// セット型は配列、バイナリは base64 文字列として返す。
pub fn attribute_to_json(attribute: &AttributeValue) -> Result<Value, TodoError> {
    let value = match attribute {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .map(attribute_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        AttributeValue::M(map) => Value::Object(item_to_json(map)?),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        AttributeValue::B(blob) => Value::String(STANDARD.encode(blob)),
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(STANDARD.encode(blob)))
                .collect(),
        ),
        other => {
            return Err(TodoError::Serialization(format!(
                "unsupported attribute value: {other:?}"
            )))
        }
    };

    Ok(value)
}

fn parse_number(raw: &str) -> Result<Number, TodoError> {
    raw.parse::<Number>()
        .map_err(|e| TodoError::Serialization(format!("invalid number attribute {raw:?}: {e}")))
}

fn item_to_json(item: &Item) -> Result<Map<String, Value>, TodoError> {
    item.iter()
        .map(|(name, attribute)| Ok((name.clone(), attribute_to_json(attribute)?)))
        .collect()
}

/// ToDo レコードを DynamoDB アイテムに変換
pub fn record_to_item(record: &TodoRecord) -> Item {
    record
        .fields()
        .iter()
        .map(|(name, value)| (name.clone(), json_to_attribute(value)))
        .collect()
}

/// DynamoDB アイテムから ToDo レコードを復元
pub fn item_to_record(item: &Item) -> Result<TodoRecord, TodoError> {
    TodoRecord::from_fields(item_to_json(item)?)
}

pub fn id_key(id: &str) -> (String, AttributeValue) {
    (ID_FIELD.to_string(), AttributeValue::S(id.to_string()))
}

/// UpdateItem に渡す SET 式と属性名・値のマップ
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl UpdateExpression {
    /// パッチの各フィールドを `#fN = :vN` として SET する式を組み立てる
    ///
    /// 存在チェック用に `#id` も属性名マップへ含める。
    pub fn from_patch(patch: &TodoPatch) -> Self {
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        let mut set_parts = Vec::with_capacity(patch.len());

        for (idx, (field, value)) in patch.fields().iter().enumerate() {
            let name_key = format!("#f{idx}");
            let value_key = format!(":v{idx}");
            set_parts.push(format!("{name_key} = {value_key}"));
            names.insert(name_key, field.clone());
            values.insert(value_key, json_to_attribute(value));
        }

        names.insert(ID_NAME_PLACEHOLDER.to_string(), ID_FIELD.to_string());

        Self {
            expression: format!("SET {}", set_parts.join(", ")),
            names,
            values,
        }
    }

    pub fn condition() -> String {
        format!("attribute_exists({ID_NAME_PLACEHOLDER})")
    }
}
