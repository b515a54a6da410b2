use anyhow::Result;
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::client::weaviate::{Output, WeaviateBatchDelete, WeaviateMatch, WeaviateWhere};
use crate::config::{ClassOptions, Opts};

#[derive(Parser, Debug, Clone)]
pub struct RemoveCommand {
    /// 要删除的图片 ID
    #[arg(required = true)]
    pub ids: Vec<String>,
    #[command(flatten)]
    pub class: ClassOptions,
    /// 只统计匹配数量，不实际删除
    #[arg(long)]
    pub dry_run: bool,
}

impl SubCommandExtend for RemoveCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let request = WeaviateBatchDelete::new(WeaviateMatch {
            class: self.class.class.clone(),
            where_: WeaviateWhere::id_in(&self.ids),
        })
        .output(Output::Minimal)
        .dry_run(self.dry_run);

        let result = opts.weaviate()?.batch_delete(&request).await?;
        let results = &result["results"];
        info!(
            "匹配 {}，成功 {}，失败 {}",
            results["matches"], results["successful"], results["failed"]
        );
        println!("{}", serde_json::to_string_pretty(results)?);
        Ok(())
    }
}
