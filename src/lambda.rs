use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shop_download::adapters::{ExplorerPaymentVerifier, GitHubContentSource};
use shop_download::utils::{logger, validation::Validate};
use shop_download::{DownloadHandler, GatewayRequest, GatewayResponse, ShopConfig};
use std::sync::Arc;

type Handler = DownloadHandler<ExplorerPaymentVerifier, GitHubContentSource>;

async fn function_handler(
    handler: &Handler,
    event: LambdaEvent<GatewayRequest>,
) -> Result<GatewayResponse, Error> {
    tracing::debug!("Request {}", event.context.request_id);
    Ok(handler.handle(&event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = ShopConfig::from_env()?;
    config.validate()?;

    let handler = Arc::new(DownloadHandler::from_config(&config)?);
    tracing::info!(
        "Download function ready ({} products)",
        handler.catalog().product_ids().count()
    );

    run(service_fn(move |event: LambdaEvent<GatewayRequest>| {
        let handler = Arc::clone(&handler);
        async move { function_handler(&handler, event).await }
    }))
    .await
}
