pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, ShopConfig};
pub use crate::core::handler::DownloadHandler;
pub use crate::core::http::{GatewayRequest, GatewayResponse};
pub use utils::error::{DownloadError, Result};
