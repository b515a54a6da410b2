use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use serde_json::json;

use super::upload::upload_directory;
use crate::cli::SubCommandExtend;
use crate::client::Rendition;
use crate::config::{CollectOptions, Opts, OutputFormat, RenditionOptions};
use crate::utils::{pb_style, write_output};

#[derive(Parser, Debug, Clone)]
pub struct CaptionCommand {
    #[command(flatten)]
    pub collect: CollectOptions,
    #[command(flatten)]
    pub rendition: RenditionOptions,
    /// 将发送给描述服务的缩略图保存到该目录
    #[arg(long, value_name = "DIR")]
    pub preview: Option<PathBuf>,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for CaptionCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let db = opts.image_db()?;
        let captioner = opts.captioner()?;
        let rendition = Rendition::from(&self.rendition);

        let (images, ids) = upload_directory(&db, &self.collect).await?;

        let pb = ProgressBar::new(images.len() as u64).with_style(pb_style());
        let mut results = vec![];
        for (image, id) in images.iter().zip(&ids) {
            pb.set_message(image.name.clone());
            let jpeg = db
                .fetch_jpg(id, &rendition)
                .await
                .with_context(|| format!("下载缩略图 {} 失败", id))?;
            if let Some(dir) = &self.preview {
                write_output(dir, &format!("{}.jpg", image.stem()), &jpeg).await?;
            }
            let response = captioner
                .predict(jpeg)
                .await
                .with_context(|| format!("生成描述失败: {}", image.name))?;

            match self.output_format {
                OutputFormat::Table => {
                    let caption = response.best().map(|c| c.caption.as_str()).unwrap_or("-");
                    pb.suspend(|| println!("{}\t{}\t{}", id, image.name, caption));
                }
                OutputFormat::Json => {
                    results.push(json!({ "name": image.name, "id": id, "response": response }));
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("描述生成完成");

        if self.output_format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Ok(())
    }
}
