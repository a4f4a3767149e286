pub mod config;
pub mod error;

pub use config::BraincraftConfig;
pub use error::{BraincraftError, Result};
