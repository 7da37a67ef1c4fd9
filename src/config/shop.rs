use crate::domain::model::{Catalog, Price, ProductEntry, ProductFile, BUNDLE_SENTINEL};
use crate::domain::payment::{PaymentSettings, VerificationPolicy};
use crate::utils::error::{DownloadError, Result};
use crate::utils::validation::{
    validate_evm_address, validate_non_empty_string, validate_range, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_REPOSITORY: &str = "captainsvbot/captainsv-products";
pub const DEFAULT_USER_AGENT: &str = "CaptainSV-Shop";
pub const DEFAULT_EXPLORER_API: &str = "https://api.basescan.org/api";
pub const DEFAULT_WALLET: &str = "0xA9747e476FFC17182E673bCe50d966f64852Bab1";
/// USDC on Base.
pub const DEFAULT_TOKEN_CONTRACT: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
pub const DEFAULT_TOLERANCE_PERCENT: u8 = 1;

/// Deploy-time settings for the download handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    pub file_host: FileHostConfig,
    pub explorer: ExplorerConfig,
    pub payment: PaymentConfig,
    pub catalog: CatalogConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHostConfig {
    pub api_base: String,
    pub repository: String,
    pub token: String,
    pub user_agent: String,
}

impl Default for FileHostConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            token: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl std::fmt::Debug for FileHostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHostConfig")
            .field("api_base", &self.api_base)
            .field("repository", &self.repository)
            .field("token", &"***")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub api_base: String,
    pub api_key: Option<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_EXPLORER_API.to_string(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ExplorerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub wallet: String,
    pub token_contract: Option<String>,
    pub tolerance_percent: u8,
    pub policy: VerificationPolicy,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            wallet: DEFAULT_WALLET.to_string(),
            token_contract: Some(DEFAULT_TOKEN_CONTRACT.to_string()),
            tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
            policy: VerificationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub id: String,
    /// File name in the repository, or `bundle`.
    pub file: String,
    /// Stablecoin amount, e.g. `25` or `12.5`.
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub products: Vec<ProductConfig>,
    /// Product ids joined, in this order, for a bundle download.
    pub bundle: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let product = |id: &str, file: &str, price: f64| ProductConfig {
            id: id.to_string(),
            file: file.to_string(),
            price,
        };

        Self {
            products: vec![
                product("playbook", "advanced-security-playbook.md", 25.0),
                product("opsec", "agent-opsec-manual.md", 15.0),
                product("incident", "incident-response-kit.md", 10.0),
                product("audit", "5-minute-security-audit.md", 5.0),
                product("bundle", BUNDLE_SENTINEL, 45.0),
            ],
            bundle: ["playbook", "opsec", "incident", "audit"]
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

impl ShopConfig {
    /// Builds the configuration from environment variables, falling back to
    /// the production defaults for everything except the file host token.
    pub fn from_env() -> Result<Self> {
        let token =
            env::var("GITHUB_PRODUCTS_TOKEN").map_err(|_| DownloadError::MissingConfigError {
                field: "GITHUB_PRODUCTS_TOKEN".to_string(),
            })?;

        let tolerance_percent = match env::var("PAYMENT_TOLERANCE_PERCENT") {
            Ok(value) => {
                value
                    .trim()
                    .parse()
                    .map_err(|_| DownloadError::InvalidConfigValueError {
                        field: "PAYMENT_TOLERANCE_PERCENT".to_string(),
                        value: value.clone(),
                        reason: "Expected a whole number of percent".to_string(),
                    })?
            }
            Err(_) => DEFAULT_TOLERANCE_PERCENT,
        };

        let policy = match env::var("VERIFICATION_POLICY") {
            Ok(value) => value
                .parse()
                .map_err(|reason| DownloadError::InvalidConfigValueError {
                    field: "VERIFICATION_POLICY".to_string(),
                    value: value.clone(),
                    reason,
                })?,
            Err(_) => VerificationPolicy::default(),
        };

        Ok(Self {
            file_host: FileHostConfig {
                api_base: env_or("GITHUB_API_BASE", DEFAULT_GITHUB_API),
                repository: env_or("GITHUB_REPO", DEFAULT_REPOSITORY),
                token,
                user_agent: env_or("GITHUB_USER_AGENT", DEFAULT_USER_AGENT),
            },
            explorer: ExplorerConfig {
                api_base: env_or("BASESCAN_API", DEFAULT_EXPLORER_API),
                api_key: env::var("BASESCAN_API_KEY").ok().filter(|key| !key.is_empty()),
            },
            payment: PaymentConfig {
                wallet: env_or("PAYMENT_WALLET", DEFAULT_WALLET),
                token_contract: Some(env_or("USDC_CONTRACT", DEFAULT_TOKEN_CONTRACT)),
                tolerance_percent,
                policy,
            },
            catalog: CatalogConfig::default(),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DownloadError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DownloadError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| DownloadError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Builds the immutable catalog; prices and files come from the same entries.
    pub fn build_catalog(&self) -> Result<Catalog> {
        let mut products = BTreeMap::new();

        for product in &self.catalog.products {
            validate_non_empty_string("catalog.products.id", &product.id)?;
            validate_non_empty_string("catalog.products.file", &product.file)?;

            let price = Price::from_decimal(product.price).ok_or_else(|| {
                DownloadError::InvalidConfigValueError {
                    field: format!("catalog.products.{}.price", product.id),
                    value: product.price.to_string(),
                    reason: "Price must be a non-negative amount".to_string(),
                }
            })?;

            let file = if product.file == BUNDLE_SENTINEL {
                ProductFile::Bundle
            } else {
                ProductFile::Single(product.file.clone())
            };

            if products
                .insert(product.id.clone(), ProductEntry { file, price })
                .is_some()
            {
                return Err(DownloadError::InvalidConfigValueError {
                    field: "catalog.products.id".to_string(),
                    value: product.id.clone(),
                    reason: "Duplicate product id".to_string(),
                });
            }
        }

        for member in &self.catalog.bundle {
            match products.get(member) {
                Some(ProductEntry {
                    file: ProductFile::Single(_),
                    ..
                }) => {}
                _ => {
                    return Err(DownloadError::InvalidConfigValueError {
                        field: "catalog.bundle".to_string(),
                        value: member.clone(),
                        reason: "Bundle members must be single-file products".to_string(),
                    })
                }
            }
        }

        let has_bundle = products
            .values()
            .any(|entry| entry.file == ProductFile::Bundle);
        if has_bundle && self.catalog.bundle.is_empty() {
            return Err(DownloadError::ConfigError {
                message: "catalog.bundle must list at least one product".to_string(),
            });
        }

        Ok(Catalog::new(products, self.catalog.bundle.clone()))
    }

    pub fn payment_settings(&self) -> PaymentSettings {
        PaymentSettings {
            wallet: self.payment.wallet.clone(),
            token_contract: self.payment.token_contract.clone(),
            tolerance_percent: self.payment.tolerance_percent,
            policy: self.payment.policy,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Environment variable placeholder was not resolved".to_string(),
        });
    }
    Ok(())
}

impl Validate for ShopConfig {
    fn validate(&self) -> Result<()> {
        validate_url("file_host.api_base", &self.file_host.api_base)?;
        validate_non_empty_string("file_host.repository", &self.file_host.repository)?;
        validate_non_empty_string("file_host.user_agent", &self.file_host.user_agent)?;

        if self.file_host.token.trim().is_empty() {
            return Err(DownloadError::MissingConfigError {
                field: "file_host.token".to_string(),
            });
        }
        // Reported without the value so the token never reaches the logs.
        if self.file_host.token.contains("${") {
            return Err(DownloadError::ConfigError {
                message: "file_host.token references an unset environment variable".to_string(),
            });
        }

        validate_url("explorer.api_base", &self.explorer.api_base)?;

        validate_resolved("payment.wallet", &self.payment.wallet)?;
        validate_evm_address("payment.wallet", &self.payment.wallet)?;
        if let Some(contract) = &self.payment.token_contract {
            validate_evm_address("payment.token_contract", contract)?;
        }
        validate_range("payment.tolerance_percent", self.payment.tolerance_percent, 0, 50)?;

        if self.payment.policy == VerificationPolicy::Strict {
            validate_required_field("payment.token_contract", &self.payment.token_contract)?;
        }

        self.build_catalog()?;

        tracing::debug!("Shop configuration validation passed");
        Ok(())
    }
}
