use clap::Parser;
use shop_download::core::Storage;
use shop_download::utils::error::ErrorCategory;
use shop_download::utils::{logger, validation::Validate};
use shop_download::{CliConfig, DownloadError, DownloadHandler, LocalStorage};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting shop-download CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!("❌ Download failed: {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(config: &CliConfig) -> Result<(), DownloadError> {
    config.validate()?;

    let shop_config = config.load_shop_config()?;
    shop_config.validate()?;
    tracing::debug!("Shop config: {:?}", shop_config);

    let handler = DownloadHandler::from_config(&shop_config)?;
    let content = handler
        .download(Some(config.tx_hash.as_str()), Some(config.product_id.as_str()))
        .await?;

    let storage = LocalStorage::new(config.output_path.clone());
    let file_name = config.output_file_name();
    storage.write_file(&file_name, content.as_bytes()).await?;

    let output_path = storage.full_path(&file_name);
    tracing::info!("✅ Download completed ({} bytes)", content.len());
    println!("✅ Download completed!");
    println!("📁 Saved to: {}", output_path);
    Ok(())
}

fn exit_code(e: &DownloadError) -> i32 {
    if e.is_config_error() {
        return 1;
    }
    match e.category() {
        ErrorCategory::BadRequest => 1,
        ErrorCategory::Forbidden => 2,
        ErrorCategory::InternalError => 3,
    }
}
