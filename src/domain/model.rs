use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Catalog sentinel marking a product that resolves to every bundle member.
pub const BUNDLE_SENTINEL: &str = "bundle";

/// Separator placed between documents of a bundle download.
pub const BUNDLE_SEPARATOR: &str = "\n\n---\n\n";

/// Stablecoin amount in micro-units (6 fractional digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(u64);

impl Price {
    const SCALE: u64 = 1_000_000;

    pub fn from_micro_units(micro_units: u64) -> Self {
        Self(micro_units)
    }

    pub fn from_whole_units(units: u64) -> Self {
        Self(units.saturating_mul(Self::SCALE))
    }

    /// Converts a decimal amount such as `24.5`; `None` for negative or non-finite input.
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        let micro_units = (amount * Self::SCALE as f64).round();
        if micro_units > u64::MAX as f64 {
            return None;
        }
        Some(Self(micro_units as u64))
    }

    /// True when `paid` micro-units reach the price minus `tolerance_percent` percent.
    pub fn is_covered_by(&self, paid: u128, tolerance_percent: u8) -> bool {
        let required_percent = 100 - u128::from(tolerance_percent.min(100));
        paid.saturating_mul(100) >= u128::from(self.0) * required_percent
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / Self::SCALE, self.0 % Self::SCALE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFile {
    Single(String),
    Bundle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEntry {
    pub file: ProductFile,
    pub price: Price,
}

/// Product catalog and price table, keyed by the same product identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: BTreeMap<String, ProductEntry>,
    bundle_members: Vec<String>,
}

impl Catalog {
    /// Callers are expected to have checked that every bundle member is a single-file product.
    pub fn new(products: BTreeMap<String, ProductEntry>, bundle_members: Vec<String>) -> Self {
        Self {
            products,
            bundle_members,
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.products.contains_key(product_id)
    }

    pub fn price_of(&self, product_id: &str) -> Option<Price> {
        self.products.get(product_id).map(|entry| entry.price)
    }

    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    /// File names to fetch for `product_id`, in delivery order.
    pub fn files_for(&self, product_id: &str) -> Option<Vec<&str>> {
        match &self.products.get(product_id)?.file {
            ProductFile::Single(file) => Some(vec![file.as_str()]),
            ProductFile::Bundle => self
                .bundle_members
                .iter()
                .map(|member| match &self.products.get(member)?.file {
                    ProductFile::Single(file) => Some(file.as_str()),
                    ProductFile::Bundle => None,
                })
                .collect(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let single = |file: &str, price: u64| ProductEntry {
            file: ProductFile::Single(file.to_string()),
            price: Price::from_whole_units(price),
        };

        let mut products = BTreeMap::new();
        products.insert(
            "playbook".to_string(),
            single("advanced-security-playbook.md", 25),
        );
        products.insert("opsec".to_string(), single("agent-opsec-manual.md", 15));
        products.insert("incident".to_string(), single("incident-response-kit.md", 10));
        products.insert("audit".to_string(), single("5-minute-security-audit.md", 5));
        products.insert(
            BUNDLE_SENTINEL.to_string(),
            ProductEntry {
                file: ProductFile::Bundle,
                price: Price::from_whole_units(45),
            },
        );

        let bundle_members = ["playbook", "opsec", "incident", "audit"]
            .iter()
            .map(|id| id.to_string())
            .collect();

        Self::new(products, bundle_members)
    }
}

/// `result` wrapper of the explorer's JSON-RPC proxy responses.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcEnvelope<T> {
    pub result: Option<T>,
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<ReceiptLog>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("0x1")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLog {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub value: String,
}

/// Parses a `0x`-prefixed hex quantity. `None` when malformed or wider than 128 bits.
pub fn parse_hex_quantity(quantity: &str) -> Option<u128> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))?;
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return if digits.is_empty() { None } else { Some(0) };
    }
    if significant.len() > 32 {
        return None;
    }
    u128::from_str_radix(significant, 16).ok()
}
