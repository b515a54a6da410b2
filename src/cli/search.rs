use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use crate::cli::SubCommandExtend;
use crate::client::weaviate::{IMAGE_PROPERTY, NearTextHit, NearTextQuery};
use crate::config::{ClassOptions, Opts, OutputFormat};
use crate::utils::{safe_file_name, write_output};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    /// 搜索文本，可以指定多个概念
    #[arg(required = true)]
    pub concepts: Vec<String>,
    #[command(flatten)]
    pub class: ClassOptions,
    /// 显示的结果数量
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    pub limit: usize,
    /// 同时取回匹配的图片，保存为 `<DIR>/<id>.jpg`
    #[arg(long, value_name = "DIR")]
    pub save: Option<PathBuf>,
    /// 通过图片服务的 near_text 接口查询，直接输出响应
    #[arg(long, conflicts_with_all = ["class", "limit", "save", "output_format"])]
    pub via_image_db: bool,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        if self.via_image_db {
            let response = opts.image_db()?.near_text(&self.concepts.join(" ")).await?;
            println!("{}", response);
            return Ok(());
        }

        let mut query = NearTextQuery::new(&self.class.class, self.concepts.clone()).limit(self.limit);
        if self.save.is_some() {
            query = query.with_image();
        }
        let mut result = opts.weaviate()?.near_text(&query).await?;

        if let Some(dir) = &self.save {
            for hit in &mut result {
                save_image(dir, hit).await?;
            }
        }
        print_result(&result, self.output_format)
    }
}

/// 解码并保存结果中的图片，输出的结果中不再保留 base64 属性
async fn save_image(dir: &Path, hit: &mut NearTextHit) -> Result<()> {
    let name = format!("{}.jpg", safe_file_name(&hit.id)?);
    let image = hit.image().with_context(|| format!("{} 的图片不是合法的 base64", hit.id))?;
    hit.properties.remove(IMAGE_PROPERTY);
    match image {
        Some(jpeg) => {
            let path = write_output(dir, &name, &jpeg).await?;
            info!("已保存 {}", path.display());
        }
        None => warn!("{} 没有返回图片", hit.id),
    }
    Ok(())
}

fn print_result(result: &[NearTextHit], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for hit in result {
                match hit.certainty {
                    Some(certainty) => println!("{:.2}\t{}", certainty, hit.id),
                    None => println!("-\t{}", hit.id),
                }
            }
        }
    }
    Ok(())
}
