use std::num::NonZeroU32;

use log::{debug, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{check_status, endpoint, read_stream};
use crate::collect::LocalImage;
use crate::error::{ClientError, Result};

/// 图片服务分配的 ID
pub type ImageId = String;

/// JPEG 缩略图参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendition {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
    /// JPEG 质量，1 到 100
    pub quality: u8,
}

/// `upload_raw` 的两种响应格式
///
/// 旧版服务直接返回 ID 数组，新版返回 `{"ids": [...]}`，两者都按原样接受。
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UploadResponse {
    Ids { ids: Vec<ImageId> },
    List(Vec<ImageId>),
}

impl UploadResponse {
    pub fn into_ids(self) -> Vec<ImageId> {
        match self {
            Self::Ids { ids } => ids,
            Self::List(ids) => ids,
        }
    }
}

/// 图片存储服务客户端
#[derive(Debug, Clone)]
pub struct ImageDb {
    base: Url,
    http: Client,
}

impl ImageDb {
    pub fn new(base: Url, http: Client) -> Self {
        Self { base, http }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn health(&self) -> Result<()> {
        let resp = self.http.get(endpoint(&self.base, &["health"])).send().await?;
        check_status("GET", resp).await?;
        Ok(())
    }

    /// 一次 multipart 请求上传所有图片，返回的 ID 与 `images` 顺序一致
    pub async fn upload_raw(&self, images: &[LocalImage]) -> Result<Vec<ImageId>> {
        if images.is_empty() {
            return Err(ClientError::EmptyUpload);
        }

        let mut form = Form::new();
        for image in images {
            let part = Part::bytes(image.data.clone()).file_name(image.name.clone());
            form = form.part(image.name.clone(), part);
        }

        info!("上传 {} 张图片", images.len());
        let resp =
            self.http.post(endpoint(&self.base, &["upload_raw"])).multipart(form).send().await?;
        let resp = check_status("POST", resp).await?;
        let body = resp.bytes().await?;
        let ids = serde_json::from_slice::<UploadResponse>(&body)?.into_ids();

        if ids.len() != images.len() {
            return Err(ClientError::IdCountMismatch { sent: images.len(), received: ids.len() });
        }
        Ok(ids)
    }

    /// 获取指定尺寸和质量的 JPEG
    pub async fn fetch_jpg(&self, id: &str, rendition: &Rendition) -> Result<Vec<u8>> {
        let query = [
            ("id", id.to_string()),
            ("width", rendition.width.to_string()),
            ("height", rendition.height.to_string()),
            ("quality", rendition.quality.to_string()),
        ];
        self.fetch("fetch_jpg", &query).await
    }

    /// 获取指定尺寸的 PNG
    pub async fn fetch_png(&self, id: &str, width: NonZeroU32, height: NonZeroU32) -> Result<Vec<u8>> {
        let query =
            [("id", id.to_string()), ("width", width.to_string()), ("height", height.to_string())];
        self.fetch("fetch_png", &query).await
    }

    /// 获取上传时的原始文件
    pub async fn fetch_raw(&self, id: &str) -> Result<Vec<u8>> {
        self.fetch("fetch_raw", &[("id", id.to_string())]).await
    }

    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
        let resp = self.http.get(endpoint(&self.base, &[path])).query(query).send().await?;
        let resp = check_status("GET", resp).await?;
        let data = read_stream(resp).await?;
        debug!("{} 返回 {} 字节", path, data.len());
        Ok(data)
    }

    /// 通过图片服务转发的文本相似度查询，返回原始响应
    pub async fn near_text(&self, text: &str) -> Result<String> {
        let resp = self
            .http
            .get(endpoint(&self.base, &["near_text"]))
            .query(&[("text", text)])
            .send()
            .await?;
        let resp = check_status("GET", resp).await?;
        Ok(resp.text().await?)
    }
}
