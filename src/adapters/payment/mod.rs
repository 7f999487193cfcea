//! Payment provider adapters.
//!
//! - `HttpPaymentProvider` - hosted checkout and subscription changes over REST
//! - `MockPaymentProvider` - configurable mock for tests

mod http_payment_provider;
mod mock_payment_provider;

pub use http_payment_provider::{HttpPaymentProvider, PaymentApiConfig};
pub use mock_payment_provider::MockPaymentProvider;
