use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde_json::json;

use crate::cli::SubCommandExtend;
use crate::client::{ImageDb, ImageId};
use crate::collect::{LocalImage, collect_images, suffix_regex};
use crate::config::{CollectOptions, Opts, OutputFormat};

#[derive(Parser, Debug, Clone)]
pub struct UploadCommand {
    #[command(flatten)]
    pub collect: CollectOptions,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for UploadCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = opts.image_db()?;

        let start = Instant::now();
        let (images, ids) = upload_directory(&db, &self.collect).await?;
        let elapsed = start.elapsed().as_secs_f32();
        info!("图片上传完成，耗时 {:.2}s", elapsed);

        print_uploaded(&images, &ids, self.output_format)?;
        if self.output_format == OutputFormat::Table {
            println!("共 {} 张图片，耗时 {:.2}s", images.len(), elapsed);
        }
        Ok(())
    }
}

/// 读取目录并上传，返回的 ID 与图片一一对应
pub(crate) async fn upload_directory(
    db: &ImageDb,
    opts: &CollectOptions,
) -> Result<(Vec<LocalImage>, Vec<ImageId>)> {
    let suffix = opts.suffix.as_deref().map(suffix_regex).transpose()?;
    let images = collect_images(&opts.path, suffix.as_ref()).await?;
    let ids = db
        .upload_raw(&images)
        .await
        .with_context(|| format!("上传 {} 失败", opts.path.display()))?;
    Ok((images, ids))
}

fn print_uploaded(images: &[LocalImage], ids: &[ImageId], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let result = images
                .iter()
                .zip(ids)
                .map(|(image, id)| json!({ "name": image.name, "id": id }))
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Table => {
            for (image, id) in images.iter().zip(ids) {
                println!("{}\t{}", id, image.name);
            }
        }
    }
    Ok(())
}
