use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::{check_status, endpoint};
use crate::error::Result;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Caption {
    #[serde(default)]
    pub index: Option<String>,
    pub caption: String,
    #[serde(default)]
    pub probability: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CaptionResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub predictions: Vec<Caption>,
}

impl CaptionResponse {
    /// 概率最高的描述
    pub fn best(&self) -> Option<&Caption> {
        self.predictions.iter().max_by(|a, b| a.probability.total_cmp(&b.probability))
    }
}

/// 图片描述生成服务客户端
#[derive(Debug, Clone)]
pub struct Captioner {
    base: Url,
    http: Client,
}

impl Captioner {
    pub fn new(base: Url, http: Client) -> Self {
        Self { base, http }
    }

    pub async fn predict(&self, jpeg: Vec<u8>) -> Result<CaptionResponse> {
        let part = Part::bytes(jpeg).file_name("image.jpg").mime_str("image/jpeg")?;
        let form = Form::new().part("image", part);
        let resp = self
            .http
            .post(endpoint(&self.base, &["model", "predict"]))
            .multipart(form)
            .send()
            .await?;
        let resp = check_status("POST", resp).await?;
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let resp: CaptionResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "predictions": [
                    {"index": "0", "caption": "a bird sitting on a tree branch .", "probability": 0.012},
                    {"index": "1", "caption": "a bird perched on a branch .", "probability": 0.034}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(resp.predictions.len(), 2);
        assert_eq!(resp.best().unwrap().caption, "a bird perched on a branch .");
    }

    #[test]
    fn test_parse_response_without_predictions() {
        let resp: CaptionResponse = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert!(resp.predictions.is_empty());
        assert!(resp.best().is_none());
    }
}
