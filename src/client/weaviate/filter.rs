use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiOperator {
    And,
    Or,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Like,
    WithinGeoRange,
    IsNull,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum WhereValue {
    #[serde(rename = "valueInt")]
    Int(i64),
    #[serde(rename = "valueBoolean")]
    Boolean(bool),
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueText")]
    Text(String),
    #[serde(rename = "valueNumber")]
    Number(f64),
}

/// where 过滤条件
///
/// `{ operator: Or, operands: [ { path: ["id"], operator: Equal, valueText: id }, .. ] }`
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum WeaviateWhere {
    Single {
        path: Vec<String>,
        operator: Operator,
        #[serde(flatten)]
        value: WhereValue,
    },
    Multiple {
        operator: MultiOperator,
        operands: Vec<WeaviateWhere>,
    },
}

impl WeaviateWhere {
    /// 匹配任意一个 ID
    pub fn id_in<S: AsRef<str>>(ids: &[S]) -> Self {
        let mut operands = ids
            .iter()
            .map(|id| Self::Single {
                path: vec!["id".to_string()],
                operator: Operator::Equal,
                value: WhereValue::Text(id.as_ref().to_string()),
            })
            .collect::<Vec<_>>();
        if operands.len() == 1 {
            operands.remove(0)
        } else {
            Self::Multiple { operator: MultiOperator::Or, operands }
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WeaviateMatch {
    pub class: String,
    #[serde(rename = "where")]
    pub where_: WeaviateWhere,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    #[serde(rename = "minimal")]
    Minimal,
    #[serde(rename = "verbose")]
    Verbose,
}

/// 批量删除请求
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WeaviateBatchDelete {
    #[serde(rename = "match")]
    pub match_: WeaviateMatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,
    #[serde(rename = "dryRun", skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl WeaviateBatchDelete {
    pub fn new(match_: WeaviateMatch) -> Self {
        Self { match_, output: None, dry_run: None }
    }

    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }
}
