use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::client::Rendition;
use crate::config::{ImageFormat, Opts, RenditionOptions};
use crate::utils::{safe_file_name, write_output};

#[derive(Parser, Debug, Clone)]
pub struct FetchCommand {
    /// 图片 ID
    #[arg(required = true)]
    pub ids: Vec<String>,
    #[command(flatten)]
    pub rendition: RenditionOptions,
    /// 下载格式
    #[arg(long, value_enum, default_value_t = ImageFormat::Jpg)]
    pub format: ImageFormat,
    /// 保存目录
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,
}

impl SubCommandExtend for FetchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = opts.image_db()?;
        let rendition = Rendition::from(&self.rendition);

        // 下载前检查全部 ID
        let stems = self.ids.iter().map(|id| safe_file_name(id)).collect::<Result<Vec<_>>>()?;

        for (id, stem) in self.ids.iter().zip(stems) {
            let (data, name) = match self.format {
                ImageFormat::Jpg => (db.fetch_jpg(id, &rendition).await, format!("{}.jpg", stem)),
                ImageFormat::Png => (
                    db.fetch_png(id, rendition.width, rendition.height).await,
                    format!("{}.png", stem),
                ),
                ImageFormat::Raw => (db.fetch_raw(id).await, stem.to_string()),
            };
            let data = data.with_context(|| format!("下载图片 {} 失败", id))?;
            let path = write_output(&self.output, &name, &data).await?;
            info!("已保存 {} ({} 字节)", path.display(), data.len());
            println!("{}", path.display());
        }
        Ok(())
    }
}
