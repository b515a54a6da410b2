use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indicatif::ProgressStyle;
use log::debug;

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>5}/{len:5} {wide_msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// 图片 ID 会直接作为文件名，不能跳出输出目录
pub fn safe_file_name(id: &str) -> Result<&str> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        bail!("无法作为文件名的图片 ID: {:?}", id);
    }
    Ok(id)
}

/// 写入 `dir/name`，目录不存在时自动创建
pub async fn write_output(dir: &Path, name: &str, data: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("无法创建目录: {}", dir.display()))?;
    let path = dir.join(name);
    tokio::fs::write(&path, data)
        .await
        .with_context(|| format!("无法写入文件: {}", path.display()))?;
    debug!("写入 {} ({} 字节)", path.display(), data.len());
    Ok(path)
}
