use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::IMAGE_PROPERTY;

/// 写入 Weaviate 的对象
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeaviateObject {
    pub class: String,
    pub id: String,
    pub properties: Map<String, Value>,
}

impl WeaviateObject {
    pub fn new(class: impl Into<String>, id: impl Into<String>) -> Self {
        Self { class: class.into(), id: id.into(), properties: Map::new() }
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// `image` 属性为 base64 编码的 JPEG
    pub fn image(class: impl Into<String>, id: impl Into<String>, jpeg: &[u8]) -> Self {
        Self::new(class, id).property(IMAGE_PROPERTY, STANDARD.encode(jpeg))
    }
}

#[derive(Serialize)]
pub(crate) struct BatchObjects<'a> {
    pub objects: &'a [WeaviateObject],
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorList {
    #[serde(default)]
    error: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize, Default)]
struct ObjectResult {
    #[serde(default)]
    errors: Option<ErrorList>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchObjectResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    result: ObjectResult,
}

/// 批量写入中失败的对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub id: String,
    pub message: String,
}

/// 收集批量写入响应中每个对象的错误
pub(crate) fn batch_failures(results: Vec<BatchObjectResponse>) -> Vec<BatchFailure> {
    results
        .into_iter()
        .filter_map(|r| {
            let errors = r.result.errors?.error;
            if errors.is_empty() {
                return None;
            }
            let message = errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
            Some(BatchFailure { id: r.id.unwrap_or_default(), message })
        })
        .collect()
}
