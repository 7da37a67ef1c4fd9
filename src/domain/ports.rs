use crate::domain::payment::VerificationOutcome;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Decides whether a transaction paid for a product.
///
/// Implementations fail closed: lookup or parsing failures come back as
/// [`VerificationOutcome::Unavailable`], never as an error.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, tx_hash: &str, product_id: &str) -> VerificationOutcome;
}

/// Source of the raw product documents.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, file_name: &str) -> Result<String>;
}
