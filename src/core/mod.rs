pub mod handler;
pub mod http;

pub use crate::domain::model::{Catalog, Price, ProductEntry, ProductFile};
pub use crate::domain::payment::VerificationOutcome;
pub use crate::domain::ports::{ContentSource, PaymentVerifier, Storage};
pub use crate::utils::error::Result;
