use crate::adapters::{BlockExplorerClient, ExplorerPaymentVerifier, GitHubContentSource};
use crate::config::ShopConfig;
use crate::core::http::{GatewayRequest, GatewayResponse, PRODUCT_ID_PARAM, TX_HASH_PARAM};
use crate::core::{Catalog, ContentSource, PaymentVerifier, Result};
use crate::domain::model::BUNDLE_SEPARATOR;
use crate::domain::payment::VerificationOutcome;
use crate::utils::error::{DownloadError, ErrorCategory};
use crate::utils::validation::looks_like_tx_hash;
use futures::future::try_join_all;
use reqwest::Client;
use std::sync::Arc;

/// Payment-gated download endpoint.
///
/// Validates the request, asks the verifier about the transaction and only
/// then fetches the product. Bundles are fetched concurrently and joined in
/// catalog order; one failed member fails the whole download.
pub struct DownloadHandler<V: PaymentVerifier, C: ContentSource> {
    verifier: V,
    content: C,
    catalog: Arc<Catalog>,
}

impl<V: PaymentVerifier, C: ContentSource> DownloadHandler<V, C> {
    pub fn new(verifier: V, content: C, catalog: Arc<Catalog>) -> Self {
        Self {
            verifier,
            content,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn handle(&self, request: &GatewayRequest) -> GatewayResponse {
        if request.is_preflight() {
            return GatewayResponse::preflight();
        }

        let result = self
            .download(
                request.query_param(TX_HASH_PARAM),
                request.query_param(PRODUCT_ID_PARAM),
            )
            .await;

        match result {
            Ok(content) => GatewayResponse::text(content),
            Err(e) => {
                match e.category() {
                    ErrorCategory::InternalError => tracing::error!("Download error: {}", e),
                    _ => tracing::info!("Download refused: {}", e),
                }
                GatewayResponse::from_error(&e)
            }
        }
    }

    /// Returns the product's content once the payment behind `tx_hash` checks out.
    pub async fn download(
        &self,
        tx_hash: Option<&str>,
        product_id: Option<&str>,
    ) -> Result<String> {
        let (tx_hash, product_id) = match (
            tx_hash.filter(|value| !value.is_empty()),
            product_id.filter(|value| !value.is_empty()),
        ) {
            (Some(tx_hash), Some(product_id)) => (tx_hash, product_id),
            _ => return Err(DownloadError::MissingParameter),
        };

        let files = self
            .catalog
            .files_for(product_id)
            .ok_or_else(|| DownloadError::UnknownProduct {
                product_id: product_id.to_string(),
            })?;

        if !looks_like_tx_hash(tx_hash) {
            tracing::debug!("txHash {} is not a 32-byte hex hash", tx_hash);
        }

        let outcome = self.verifier.verify(tx_hash, product_id).await;
        match &outcome {
            VerificationOutcome::Verified => {
                tracing::info!("Payment {} verified for {}", tx_hash, product_id)
            }
            VerificationOutcome::Rejected(reason) => {
                tracing::info!("Payment {} rejected for {}: {}", tx_hash, product_id, reason)
            }
            VerificationOutcome::Unavailable(message) => tracing::warn!(
                "Payment {} could not be checked for {}: {}",
                tx_hash,
                product_id,
                message
            ),
        }
        if !outcome.is_verified() {
            return Err(DownloadError::PaymentNotVerified);
        }

        let contents = try_join_all(files.iter().map(|file| self.content.fetch(file))).await?;
        tracing::debug!("Delivering {} file(s) for {}", contents.len(), product_id);

        Ok(contents.join(BUNDLE_SEPARATOR))
    }
}

impl DownloadHandler<ExplorerPaymentVerifier, GitHubContentSource> {
    /// Wires the block explorer and the GitHub file host from `config`.
    pub fn from_config(config: &ShopConfig) -> Result<Self> {
        let catalog = Arc::new(config.build_catalog()?);
        let client = Client::new();

        let explorer = BlockExplorerClient::new(
            client.clone(),
            config.explorer.api_base.clone(),
            config.explorer.api_key.clone(),
        );
        let verifier =
            ExplorerPaymentVerifier::new(explorer, Arc::clone(&catalog), config.payment_settings());

        let content = GitHubContentSource::new(
            client,
            config.file_host.api_base.clone(),
            config.file_host.repository.clone(),
            config.file_host.token.clone(),
            config.file_host.user_agent.clone(),
        );

        Ok(Self::new(verifier, content, catalog))
    }
}
