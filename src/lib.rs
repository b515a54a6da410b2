pub mod cli;
pub mod client;
pub mod collect;
pub mod config;
pub mod error;
pub mod utils;

pub use client::{Captioner, ImageDb, Weaviate};
pub use collect::{LocalImage, collect_images};
pub use config::Opts;
pub use error::ClientError;
