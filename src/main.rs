use clap::Parser;
use imgdb::cli::SubCommandExtend;
use imgdb::config::{Opts, SubCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Upload(config) => config.run(&opts).await,
        SubCommand::Fetch(config) => config.run(&opts).await,
        SubCommand::Caption(config) => config.run(&opts).await,
        SubCommand::Index(config) => config.run(&opts).await,
        SubCommand::Search(config) => config.run(&opts).await,
        SubCommand::Schema(config) => config.run(&opts).await,
        SubCommand::Remove(config) => config.run(&opts).await,
        SubCommand::Health(config) => config.run(&opts).await,
    }
}
