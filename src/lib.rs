pub mod cli;
pub mod collectors;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod store;
pub mod utils;
pub mod writers;

pub use error::{PipelineError, Result};
