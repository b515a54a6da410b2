use anyhow::{Result, bail};
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::client::weaviate::ClassDefinition;
use crate::config::{ClassOptions, Opts, VectorizerOptions};

#[derive(Parser, Debug, Clone)]
pub struct SchemaCommand {
    #[command(flatten)]
    pub class: ClassOptions,
    #[command(flatten)]
    pub vectorizer: VectorizerOptions,
    /// 只显示当前的类定义
    #[arg(long)]
    pub show: bool,
}

impl SubCommandExtend for SchemaCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let weaviate = opts.weaviate()?;
        let class = &self.class.class;

        if self.show {
            match weaviate.get_class(class).await? {
                Some(definition) => println!("{}", serde_json::to_string_pretty(&definition)?),
                None => bail!("类 {} 不存在", class),
            }
            return Ok(());
        }

        let definition = ClassDefinition::clip_image(class, self.vectorizer.vectorizer)?;
        weaviate.recreate_class(&definition).await?;
        Ok(())
    }
}
