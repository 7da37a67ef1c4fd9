use shop_download::domain::payment::VerificationPolicy;
use shop_download::utils::validation::Validate;
use shop_download::{DownloadError, ShopConfig};

// Environment variables are process-wide, so every case runs inside one test.
#[test]
fn test_config_from_env() {
    std::env::remove_var("GITHUB_PRODUCTS_TOKEN");
    assert!(matches!(
        ShopConfig::from_env(),
        Err(DownloadError::MissingConfigError { .. })
    ));

    std::env::set_var("GITHUB_PRODUCTS_TOKEN", "ghp_env");
    std::env::set_var("GITHUB_REPO", "acme/env-products");
    std::env::set_var("BASESCAN_API_KEY", "explorer-key");
    std::env::set_var("VERIFICATION_POLICY", "strict");

    let config = ShopConfig::from_env().unwrap();
    assert_eq!(config.file_host.token, "ghp_env");
    assert_eq!(config.file_host.repository, "acme/env-products");
    assert_eq!(config.explorer.api_base, "https://api.basescan.org/api");
    assert_eq!(config.explorer.api_key.as_deref(), Some("explorer-key"));
    assert_eq!(config.payment.policy, VerificationPolicy::Strict);
    assert_eq!(config.payment.tolerance_percent, 1);
    assert!(config.validate().is_ok());

    std::env::set_var("PAYMENT_TOLERANCE_PERCENT", "3");
    std::env::set_var("GITHUB_USER_AGENT", "Acme-Shop");
    let config = ShopConfig::from_env().unwrap();
    assert_eq!(config.payment.tolerance_percent, 3);
    assert_eq!(config.file_host.user_agent, "Acme-Shop");

    std::env::set_var("PAYMENT_TOLERANCE_PERCENT", "one");
    assert!(matches!(
        ShopConfig::from_env(),
        Err(DownloadError::InvalidConfigValueError { .. })
    ));
    std::env::remove_var("PAYMENT_TOLERANCE_PERCENT");

    std::env::set_var("VERIFICATION_POLICY", "sometimes");
    assert!(matches!(
        ShopConfig::from_env(),
        Err(DownloadError::InvalidConfigValueError { .. })
    ));

    for name in [
        "GITHUB_PRODUCTS_TOKEN",
        "GITHUB_REPO",
        "BASESCAN_API_KEY",
        "VERIFICATION_POLICY",
        "GITHUB_USER_AGENT",
    ] {
        std::env::remove_var(name);
    }
}
