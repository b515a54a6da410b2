use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ClientError, Result};

/// 默认的图片类名
pub const DEFAULT_CLASS: &str = "ClipImage";
/// 保存 base64 图片的属性名
pub const IMAGE_PROPERTY: &str = "image";

static CLASS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z][_0-9A-Za-z]*$").expect("failed to build regex"));

/// 检查类名是否符合 Weaviate 的命名规则
pub fn validate_class_name(class: &str) -> Result<()> {
    if CLASS_NAME.is_match(class) {
        Ok(())
    } else {
        Err(ClientError::InvalidClassName(class.to_string()))
    }
}

/// 向量化模块
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vectorizer {
    /// 由 multi2vec-clip 模块根据图片计算向量
    #[default]
    Clip,
    /// 不计算向量
    None,
}

impl Vectorizer {
    pub fn module_name(&self) -> &'static str {
        match self {
            Self::Clip => "multi2vec-clip",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub data_type: Vec<String>,
}

/// Weaviate 类定义，只保留需要的字段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassDefinition {
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub vector_index_type: String,
    #[serde(default)]
    pub vectorizer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_config: Option<Value>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl ClassDefinition {
    /// 只有一个 blob 属性 `image` 的图片类
    pub fn clip_image(class: &str, vectorizer: Vectorizer) -> Result<Self> {
        validate_class_name(class)?;
        let module_config = match vectorizer {
            Vectorizer::Clip => Some(json!({
                (vectorizer.module_name()): { "imageFields": [IMAGE_PROPERTY] }
            })),
            Vectorizer::None => None,
        };
        Ok(Self {
            class: class.to_string(),
            description: None,
            vector_index_type: "hnsw".to_string(),
            vectorizer: vectorizer.module_name().to_string(),
            module_config,
            properties: vec![Property {
                name: IMAGE_PROPERTY.to_string(),
                data_type: vec!["blob".to_string()],
            }],
        })
    }
}
