pub mod config;
pub mod section;

pub use config::Config;
pub use section::*;
