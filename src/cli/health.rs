use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::Opts;

#[derive(Parser, Debug, Clone)]
pub struct HealthCommand {
    /// 等待 Weaviate 就绪
    #[arg(long)]
    pub wait: bool,
    /// 重试间隔（秒）
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub interval: u64,
    /// 最多尝试次数
    #[arg(long, value_name = "N", default_value_t = 12)]
    pub attempts: usize,
}

impl SubCommandExtend for HealthCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let mut failed = 0;

        match opts.image_db()?.health().await {
            Ok(()) => println!("image-db\tok"),
            Err(e) => {
                println!("image-db\t{}", e);
                failed += 1;
            }
        }

        let weaviate = opts.weaviate()?;
        let live = if self.wait {
            weaviate.wait_until_live(Duration::from_secs(self.interval), self.attempts).await
        } else {
            weaviate.is_live().await
        };
        match live {
            Ok(()) => println!("weaviate\tok"),
            Err(e) => {
                println!("weaviate\t{}", e);
                failed += 1;
            }
        }

        if failed > 0 {
            bail!("{} 个服务不可用", failed);
        }
        Ok(())
    }
}
