use reqwest::StatusCode;

/// 访问外部服务时可能出现的错误
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("请求失败: {0}")]
    Http(#[from] reqwest::Error),
    /// 服务返回了非 2xx 状态码
    #[error("{method} {url} 返回 {status}: {body}")]
    Status { method: &'static str, url: String, status: StatusCode, body: String },
    #[error("无法解析响应: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("没有可上传的图片")]
    EmptyUpload,
    /// `upload_raw` 依赖返回 ID 与上传文件一一对应
    #[error("上传了 {sent} 张图片，但服务返回了 {received} 个 ID")]
    IdCountMismatch { sent: usize, received: usize },
    #[error("GraphQL 查询出错: {0}")]
    GraphQl(String),
    #[error("无效的类名: {0}")]
    InvalidClassName(String),
}

impl ClientError {
    /// 服务返回的状态码，连接失败等情况下为 `None`
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
