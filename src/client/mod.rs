mod captioner;
mod imagedb;
pub mod weaviate;

use futures::StreamExt;
use reqwest::{Response, Url};

pub use self::captioner::*;
pub use self::imagedb::*;
pub use self::weaviate::Weaviate;
use crate::error::{ClientError, Result};

/// 在 `base` 的路径后追加若干段，保留 base 自带的路径前缀
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// 非 2xx 响应转换为 [`ClientError::Status`]，并带上响应正文
pub(crate) async fn check_status(method: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status { method, url, status, body })
}

/// 预分配的上限，`Content-Length` 不可信
const MAX_PREALLOC: u64 = 16 << 20;

/// 以流的方式读取完整响应体
pub(crate) async fn read_stream(resp: Response) -> Result<Vec<u8>> {
    let capacity = resp.content_length().unwrap_or(0).min(MAX_PREALLOC);
    let mut buf = Vec::with_capacity(capacity as usize);
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf)
}
