use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use reqwest::{Certificate, Client, Url};

use crate::cli::*;
use crate::client::weaviate::{DEFAULT_CLASS, Vectorizer};
use crate::client::{Captioner, ImageDb, Rendition, Weaviate};

#[derive(Parser, Debug, Clone)]
#[command(name = "imgdb", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 图片存储服务地址
    #[arg(long, env = "IMGDB_URL", default_value = "https://localhost", global = true)]
    pub db_url: Url,
    /// 图片描述服务地址
    #[arg(long, env = "IMGDB_CAPTIONER_URL", default_value = "http://localhost:5000", global = true)]
    pub captioner_url: Url,
    /// Weaviate 地址
    #[arg(long, env = "IMGDB_WEAVIATE_URL", default_value = "http://localhost:8080", global = true)]
    pub weaviate_url: Url,
    /// 额外信任的 PEM 证书，用于自签名的测试证书
    #[arg(long, value_name = "PATH", env = "IMGDB_CA_CERT", global = true)]
    pub ca_cert: Option<PathBuf>,
    /// 单个请求的超时时间（秒），默认不限制
    #[arg(long, value_name = "SECS", env = "IMGDB_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 上传目录中的图片
    Upload(UploadCommand),
    /// 下载指定 ID 的图片
    Fetch(FetchCommand),
    /// 上传图片并生成描述
    Caption(CaptionCommand),
    /// 上传图片并写入 Weaviate
    Index(IndexCommand),
    /// 以文本搜索图片
    Search(SearchCommand),
    /// 重建或查看 Weaviate 类定义
    Schema(SchemaCommand),
    /// 从 Weaviate 中删除图片
    Remove(RemoveCommand),
    /// 检查服务状态
    Health(HealthCommand),
}

impl Opts {
    /// 所有服务共用的 HTTP 客户端
    pub fn http_client(&self) -> Result<Client> {
        let mut builder = Client::builder();
        if let Some(path) = &self.ca_cert {
            let pem = std::fs::read(path)
                .with_context(|| format!("无法读取证书: {}", path.display()))?;
            let cert = Certificate::from_pem(&pem)
                .with_context(|| format!("无效的证书: {}", path.display()))?;
            debug!("添加信任证书: {}", path.display());
            builder = builder.add_root_certificate(cert);
        }
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("无法创建 HTTP 客户端")
    }

    pub fn image_db(&self) -> Result<ImageDb> {
        Ok(ImageDb::new(self.db_url.clone(), self.http_client()?))
    }

    pub fn captioner(&self) -> Result<Captioner> {
        Ok(Captioner::new(self.captioner_url.clone(), self.http_client()?))
    }

    pub fn weaviate(&self) -> Result<Weaviate> {
        Ok(Weaviate::new(self.weaviate_url.clone(), self.http_client()?))
    }
}

#[derive(Parser, Debug, Clone)]
pub struct RenditionOptions {
    /// 缩略图宽度
    #[arg(long, value_name = "PX", default_value = "600")]
    pub width: NonZeroU32,
    /// 缩略图高度
    #[arg(long, value_name = "PX", default_value = "400")]
    pub height: NonZeroU32,
    /// JPEG 质量
    #[arg(long, value_name = "Q", default_value_t = 90, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,
}

impl From<&RenditionOptions> for Rendition {
    fn from(opts: &RenditionOptions) -> Self {
        Rendition { width: opts.width, height: opts.height, quality: opts.quality }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct ClassOptions {
    /// Weaviate 类名
    #[arg(long, default_value = DEFAULT_CLASS)]
    pub class: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CollectOptions {
    /// 图片所在目录，不扫描子目录
    pub path: PathBuf,
    /// 只上传指定后缀的文件，多个后缀用逗号分隔
    #[arg(short, long)]
    pub suffix: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpg,
    Png,
    /// 上传时的原始文件
    Raw,
}

#[derive(Parser, Debug, Clone)]
pub struct VectorizerOptions {
    /// 向量化模块
    #[arg(long, value_enum, default_value_t = Vectorizer::Clip)]
    pub vectorizer: Vectorizer,
}
