// Adapters layer: concrete clients for the external systems behind the domain ports.

pub mod content_host;
pub mod explorer;

pub use content_host::GitHubContentSource;
pub use explorer::{BlockExplorerClient, ExplorerPaymentVerifier};
