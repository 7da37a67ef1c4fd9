use crate::domain::model::{Catalog, RpcEnvelope, Transaction, TransactionReceipt};
use crate::domain::payment::{
    assess, PaymentRecord, PaymentSettings, RejectReason, VerificationOutcome,
};
use crate::domain::ports::PaymentVerifier;
use crate::utils::error::{DownloadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Read-only client for an Etherscan-style `module=proxy` JSON-RPC endpoint.
#[derive(Clone)]
pub struct BlockExplorerClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl BlockExplorerClient {
    pub fn new(client: Client, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key,
        }
    }

    pub async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>> {
        self.proxy_call("eth_getTransactionReceipt", tx_hash).await
    }

    pub async fn transaction(&self, tx_hash: &str) -> Result<Option<Transaction>> {
        self.proxy_call("eth_getTransactionByHash", tx_hash).await
    }

    async fn proxy_call<T: DeserializeOwned>(
        &self,
        action: &str,
        tx_hash: &str,
    ) -> Result<Option<T>> {
        let mut query = vec![("module", "proxy"), ("action", action), ("txhash", tx_hash)];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("apikey", key));
        }

        tracing::debug!("Explorer call {} for {}", action, tx_hash);
        let response = self
            .client
            .get(&self.api_base)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let envelope: RpcEnvelope<T> = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(DownloadError::ExplorerError {
                message: error.to_string(),
            });
        }
        Ok(envelope.result)
    }
}

impl std::fmt::Debug for BlockExplorerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockExplorerClient")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Payment verifier backed by the block explorer.
#[derive(Debug, Clone)]
pub struct ExplorerPaymentVerifier {
    explorer: BlockExplorerClient,
    catalog: Arc<Catalog>,
    settings: PaymentSettings,
}

impl ExplorerPaymentVerifier {
    pub fn new(
        explorer: BlockExplorerClient,
        catalog: Arc<Catalog>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            explorer,
            catalog,
            settings,
        }
    }

    async fn check(&self, tx_hash: &str, product_id: &str) -> Result<VerificationOutcome> {
        let Some(price) = self.catalog.price_of(product_id) else {
            return Ok(VerificationOutcome::Rejected(RejectReason::UnknownProduct));
        };

        let Some(receipt) = self.explorer.transaction_receipt(tx_hash).await? else {
            return Ok(VerificationOutcome::Rejected(RejectReason::ReceiptMissing));
        };
        if !receipt.succeeded() {
            return Ok(VerificationOutcome::Rejected(RejectReason::TransactionFailed));
        }

        let Some(transaction) = self.explorer.transaction(tx_hash).await? else {
            return Ok(VerificationOutcome::Rejected(RejectReason::TransactionMissing));
        };

        let record = PaymentRecord::from_explorer(&receipt, &transaction);
        Ok(assess(&record, price, &self.settings))
    }
}

#[async_trait]
impl PaymentVerifier for ExplorerPaymentVerifier {
    async fn verify(&self, tx_hash: &str, product_id: &str) -> VerificationOutcome {
        match self.check(tx_hash, product_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Payment verification failed for {}: {}", tx_hash, e);
                VerificationOutcome::Unavailable(e.to_string())
            }
        }
    }
}
