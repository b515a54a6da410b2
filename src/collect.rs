use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use regex::Regex;
use walkdir::WalkDir;

/// 从本地目录读入的一张图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    /// 文件名（不含目录）
    pub name: String,
    pub data: Vec<u8>,
}

impl LocalImage {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self { name: name.into(), data }
    }

    /// 去掉最后一个扩展名后的文件名
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

/// 根据逗号分隔的后缀列表构建匹配扩展名的正则，忽略大小写
pub fn suffix_regex(suffix: &str) -> Result<Regex> {
    let alternatives = suffix
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)^({})$", alternatives)).context("无效的后缀列表")
}

/// 列出目录下的普通文件，不递归，按文件名排序
pub fn scan_directory(path: impl AsRef<Path>, suffix: Option<&Regex>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    info!("开始扫描目录: {}", path.display());

    let mut entries = vec![];
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("无法读取目录: {}", path.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(re) = suffix {
            let matched = entry
                .path()
                .extension()
                .is_some_and(|ext| re.is_match(&ext.to_string_lossy()));
            if !matched {
                debug!("跳过文件: {}", entry.path().display());
                continue;
            }
        }
        entries.push(entry.into_path());
    }

    info!("扫描完成，共 {} 个文件", entries.len());
    Ok(entries)
}

/// 读取目录下所有图片到内存
pub async fn collect_images(
    path: impl AsRef<Path>,
    suffix: Option<&Regex>,
) -> Result<Vec<LocalImage>> {
    let mut images = vec![];
    for entry in scan_directory(path, suffix)? {
        let data = tokio::fs::read(&entry)
            .await
            .with_context(|| format!("无法读取文件: {}", entry.display()))?;
        let name = entry
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        images.push(LocalImage { name, data });
    }
    Ok(images)
}
