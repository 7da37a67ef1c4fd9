pub mod cli;
pub mod shop;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

pub use shop::ShopConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "shop-download")]
#[command(about = "Verify an on-chain payment and download the purchased product")]
pub struct CliConfig {
    #[arg(long, help = "Hash of the payment transaction")]
    pub tx_hash: String,

    #[arg(long, help = "Product to download (e.g. playbook, opsec, incident, audit, bundle)")]
    pub product_id: String,

    #[arg(long, help = "TOML configuration file; environment variables are used when omitted")]
    pub config: Option<String>,

    #[arg(long, default_value = "./downloads")]
    pub output_path: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn load_shop_config(&self) -> Result<ShopConfig> {
        match &self.config {
            Some(path) => ShopConfig::from_file(path),
            None => ShopConfig::from_env(),
        }
    }

    pub fn output_file_name(&self) -> String {
        format!("{}.md", self.product_id)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("output_path", &self.output_path)?;
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        Ok(())
    }
}
