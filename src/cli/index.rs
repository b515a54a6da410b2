use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::ProgressBar;
use log::{info, warn};

use super::upload::upload_directory;
use crate::cli::SubCommandExtend;
use crate::client::Rendition;
use crate::client::weaviate::{ClassDefinition, Weaviate, WeaviateObject};
use crate::config::{ClassOptions, CollectOptions, Opts, RenditionOptions, VectorizerOptions};
use crate::utils::{pb_style, write_output};

#[derive(Parser, Debug, Clone)]
pub struct IndexCommand {
    #[command(flatten)]
    pub collect: CollectOptions,
    #[command(flatten)]
    pub rendition: RenditionOptions,
    #[command(flatten)]
    pub class: ClassOptions,
    #[command(flatten)]
    pub vectorizer: VectorizerOptions,
    /// 每批写入的对象数量，0 表示逐个写入
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub batch_size: usize,
    /// 将写入的缩略图保存到该目录
    #[arg(long, value_name = "DIR")]
    pub preview: Option<PathBuf>,
    /// 不重建类定义，直接写入
    #[arg(long)]
    pub keep_schema: bool,
}

impl SubCommandExtend for IndexCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = opts.image_db()?;
        let weaviate = opts.weaviate()?;
        let rendition = Rendition::from(&self.rendition);
        let class = &self.class.class;

        let definition = ClassDefinition::clip_image(class, self.vectorizer.vectorizer)?;
        // 重建会清空已有对象，必须在图片上传成功之后
        let (images, ids) = upload_directory(&db, &self.collect).await?;
        if !self.keep_schema {
            weaviate.recreate_class(&definition).await.context("重建类定义失败")?;
        }

        let pb = ProgressBar::new(images.len() as u64).with_style(pb_style());
        let mut pending = Vec::with_capacity(self.batch_size);
        let mut failed = 0;
        for (image, id) in images.iter().zip(&ids) {
            pb.set_message(image.name.clone());
            let jpeg = db
                .fetch_jpg(id, &rendition)
                .await
                .with_context(|| format!("下载缩略图 {} 失败", id))?;
            if let Some(dir) = &self.preview {
                write_output(dir, &format!("{}.jpg", image.stem()), &jpeg).await?;
            }

            let object = WeaviateObject::image(class, id, &jpeg);
            if self.batch_size == 0 {
                weaviate
                    .create_object(&object)
                    .await
                    .with_context(|| format!("写入 {} 失败", image.name))?;
                pb.inc(1);
            } else {
                pending.push(object);
                if pending.len() >= self.batch_size {
                    failed += flush(&weaviate, &mut pending, &pb).await?;
                }
            }
        }
        failed += flush(&weaviate, &mut pending, &pb).await?;
        pb.finish_with_message("图片写入完成");

        if failed > 0 {
            bail!("{} 张图片写入失败", failed);
        }
        info!("共写入 {} 张图片到 {}", images.len(), class);
        Ok(())
    }
}

/// 批量写入缓冲区中的对象，返回失败数量
async fn flush(
    weaviate: &Weaviate,
    pending: &mut Vec<WeaviateObject>,
    pb: &ProgressBar,
) -> Result<usize> {
    if pending.is_empty() {
        return Ok(0);
    }
    let failures = weaviate.batch_create(pending).await.context("批量写入失败")?;
    for failure in &failures {
        warn!("写入 {} 失败: {}", failure.id, failure.message);
    }
    pb.inc(pending.len() as u64);
    pending.clear();
    Ok(failures.len())
}
