//! Weaviate 向量数据库客户端
//!
//! 只实现了建表、写入对象、批量删除和 nearText 查询几个接口。

mod filter;
mod graphql;
mod object;
mod schema;

use std::time::Duration;

use log::{info, warn};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

pub use self::filter::*;
pub use self::graphql::{NearTextHit, NearTextQuery};
pub use self::object::{BatchFailure, WeaviateObject};
pub use self::schema::*;
use self::graphql::{GraphQlRequest, parse_near_text};
use self::object::{BatchObjectResponse, BatchObjects, batch_failures};
use super::{check_status, endpoint};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct Weaviate {
    base: Url,
    http: Client,
}

impl Weaviate {
    pub fn new(base: Url, http: Client) -> Self {
        Self { base, http }
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut full = vec!["v1"];
        full.extend_from_slice(segments);
        endpoint(&self.base, &full)
    }

    pub async fn is_live(&self) -> Result<()> {
        let resp = self.http.get(self.url(&[".well-known", "live"])).send().await?;
        check_status("GET", resp).await?;
        Ok(())
    }

    /// 轮询直到服务可用，超过 `attempts` 次后返回最后一次的错误
    pub async fn wait_until_live(&self, interval: Duration, attempts: usize) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.is_live().await {
                Ok(()) => {
                    info!("weaviate 已就绪");
                    return Ok(());
                }
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    warn!("weaviate 尚未就绪，{}s 后重试: {}", interval.as_secs_f32(), e);
                    tokio::time::sleep(interval).await;
                    attempt += 1;
                }
            }
        }
    }

    pub async fn get_class(&self, class: &str) -> Result<Option<ClassDefinition>> {
        validate_class_name(class)?;
        let resp = self.http.get(self.url(&["schema", class])).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status("GET", resp).await?;
        let body = resp.bytes().await?;
        // 部分版本对不存在的类返回 200 和空响应
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice::<Value>(&body)? {
            Value::Null => Ok(None),
            value => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    pub async fn delete_class(&self, class: &str) -> Result<()> {
        validate_class_name(class)?;
        let resp = self.http.delete(self.url(&["schema", class])).send().await?;
        check_status("DELETE", resp).await?;
        Ok(())
    }

    pub async fn create_class(&self, definition: &ClassDefinition) -> Result<()> {
        validate_class_name(&definition.class)?;
        let resp = self.http.post(self.url(&["schema"])).json(definition).send().await?;
        check_status("POST", resp).await?;
        Ok(())
    }

    /// 先删除再创建类
    ///
    /// 删除被服务拒绝（例如类不存在）时只记录警告，网络错误仍会返回。
    pub async fn recreate_class(&self, definition: &ClassDefinition) -> Result<()> {
        match self.delete_class(&definition.class).await {
            Ok(()) => info!("已删除类 {}", definition.class),
            Err(e @ ClientError::Status { .. }) => warn!("删除类 {} 失败: {}", definition.class, e),
            Err(e) => return Err(e),
        }
        self.create_class(definition).await?;
        info!("已创建类 {} (vectorizer: {})", definition.class, definition.vectorizer);
        Ok(())
    }

    pub async fn create_object(&self, object: &WeaviateObject) -> Result<()> {
        let resp = self.http.post(self.url(&["objects"])).json(object).send().await?;
        check_status("POST", resp).await?;
        Ok(())
    }

    /// 批量写入对象，返回写入失败的对象
    pub async fn batch_create(&self, objects: &[WeaviateObject]) -> Result<Vec<BatchFailure>> {
        if objects.is_empty() {
            return Ok(vec![]);
        }
        let resp = self
            .http
            .post(self.url(&["batch", "objects"]))
            .json(&BatchObjects { objects })
            .send()
            .await?;
        let resp = check_status("POST", resp).await?;
        let results: Vec<BatchObjectResponse> = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(batch_failures(results))
    }

    /// 批量删除，返回服务端的原始结果
    pub async fn batch_delete(&self, request: &WeaviateBatchDelete) -> Result<Value> {
        validate_class_name(&request.match_.class)?;
        let resp = self.http.delete(self.url(&["batch", "objects"])).json(request).send().await?;
        let resp = check_status("DELETE", resp).await?;
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }

    pub async fn near_text(&self, query: &NearTextQuery) -> Result<Vec<NearTextHit>> {
        let graphql = query.to_graphql()?;
        let resp = self
            .http
            .post(self.url(&["graphql"]))
            .json(&GraphQlRequest { query: &graphql })
            .send()
            .await?;
        let resp = check_status("POST", resp).await?;
        parse_near_text(&query.class, &resp.bytes().await?)
    }
}
