use crate::utils::error::{DownloadError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DownloadError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| DownloadError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Checks for a `0x`-prefixed, 20-byte hex account address.
pub fn validate_evm_address(field_name: &str, address: &str) -> Result<()> {
    if !is_hex_with_prefix(address, 40) {
        return Err(DownloadError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: address.to_string(),
            reason: "Address must be 0x followed by 40 hex digits".to_string(),
        });
    }
    Ok(())
}

/// True when `hash` has the shape of a transaction hash (`0x` + 64 hex digits).
pub fn looks_like_tx_hash(hash: &str) -> bool {
    is_hex_with_prefix(hash, 64)
}

fn is_hex_with_prefix(value: &str, digits: usize) -> bool {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => hex.len() == digits && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("explorer.api_base", "https://api.basescan.org/api").is_ok());
        assert!(validate_url("explorer.api_base", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("explorer.api_base", "").is_err());
        assert!(validate_url("explorer.api_base", "invalid-url").is_err());
        assert!(validate_url("explorer.api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_evm_address() {
        assert!(
            validate_evm_address("payment.wallet", "0xA9747e476FFC17182E673bCe50d966f64852Bab1")
                .is_ok()
        );
        assert!(
            validate_evm_address("payment.wallet", "A9747e476FFC17182E673bCe50d966f64852Bab1")
                .is_err()
        );
        assert!(validate_evm_address("payment.wallet", "0x1234").is_err());
        assert!(
            validate_evm_address("payment.wallet", "0xZZ747e476FFC17182E673bCe50d966f64852Bab1")
                .is_err()
        );
    }

    #[test]
    fn test_looks_like_tx_hash() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(looks_like_tx_hash(&hash));
        assert!(!looks_like_tx_hash("0xabc"));
        assert!(!looks_like_tx_hash(&"ab".repeat(32)));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("payment.tolerance_percent", 1u8, 1, 100).is_ok());
        assert!(validate_range("payment.tolerance_percent", 0u8, 1, 100).is_err());
    }
}
