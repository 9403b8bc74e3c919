pub mod config;
pub mod error;
pub mod model;
pub mod query;

pub use error::{LogVaultError, Result};
