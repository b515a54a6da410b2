mod caption;
mod fetch;
mod health;
mod index;
mod remove;
mod schema;
mod search;
mod upload;

pub use caption::*;
pub use fetch::*;
pub use health::*;
pub use index::*;
pub use remove::*;
pub use schema::*;
pub use search::*;
pub use upload::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
