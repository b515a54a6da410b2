use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{IMAGE_PROPERTY, validate_class_name};
use crate::error::{ClientError, Result};

/// nearText 相似度查询
#[derive(Debug, Clone, PartialEq)]
pub struct NearTextQuery {
    pub class: String,
    pub concepts: Vec<String>,
    pub limit: Option<usize>,
    /// 除 `_additional` 外需要返回的属性
    pub properties: Vec<String>,
}

impl NearTextQuery {
    pub fn new(class: impl Into<String>, concepts: Vec<String>) -> Self {
        Self { class: class.into(), concepts, limit: None, properties: vec![] }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 同时返回 base64 编码的图片
    pub fn with_image(mut self) -> Self {
        if !self.properties.iter().any(|p| p == IMAGE_PROPERTY) {
            self.properties.push(IMAGE_PROPERTY.to_string());
        }
        self
    }

    /// 生成 GraphQL 查询语句
    pub fn to_graphql(&self) -> Result<String> {
        validate_class_name(&self.class)?;
        // JSON 字符串字面量同时也是合法的 GraphQL 字符串
        let concepts = serde_json::to_string(&self.concepts)?;
        let mut args = format!("nearText: {{concepts: {}}}", concepts);
        if let Some(limit) = self.limit {
            args.push_str(&format!(", limit: {}", limit));
        }
        let mut fields = self.properties.join(" ");
        if !fields.is_empty() {
            fields.push(' ');
        }
        Ok(format!(
            "{{ Get {{ {}({}) {{ {}_additional {{ certainty id }} }} }} }}",
            self.class, args, fields
        ))
    }
}

#[derive(Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'a str,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize, Default)]
struct Additional {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    certainty: Option<f64>,
}

/// 一条查询结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearTextHit {
    pub id: String,
    pub certainty: Option<f64>,
    pub properties: Map<String, Value>,
}

impl NearTextHit {
    /// 解码 `image` 属性，查询时没有请求该属性则返回 `None`
    pub fn image(&self) -> std::result::Result<Option<Vec<u8>>, base64::DecodeError> {
        match self.properties.get(IMAGE_PROPERTY).and_then(Value::as_str) {
            Some(encoded) => STANDARD.decode(encoded).map(Some),
            None => Ok(None),
        }
    }
}

/// 从 `{"data": {"Get": {<class>: [...]}}}` 中取出结果
pub(crate) fn parse_near_text(class: &str, body: &[u8]) -> Result<Vec<NearTextHit>> {
    let resp: GraphQlResponse = serde_json::from_slice(body)?;
    if !resp.errors.is_empty() {
        let messages = resp.errors.into_iter().map(|e| e.message).collect::<Vec<_>>();
        return Err(ClientError::GraphQl(messages.join("; ")));
    }

    let objects = match resp.data.as_ref().and_then(|data| data.pointer(&format!("/Get/{}", class)))
    {
        Some(Value::Array(objects)) => objects.clone(),
        Some(Value::Null) | None => vec![],
        Some(other) => {
            return Err(ClientError::GraphQl(format!("意外的查询结果: {}", other)));
        }
    };

    let mut hits = Vec::with_capacity(objects.len());
    for object in objects {
        let Value::Object(mut properties) = object else {
            continue;
        };
        let additional = match properties.remove("_additional") {
            Some(value) => serde_json::from_value::<Additional>(value)?,
            None => Additional::default(),
        };
        hits.push(NearTextHit {
            id: additional.id.unwrap_or_default(),
            certainty: additional.certainty,
            properties,
        });
    }
    Ok(hits)
}
