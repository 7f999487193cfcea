//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` and `AuthProvider` ports:
//!
//! - `JwtSessionValidator` - HS256 access token validation
//! - `HttpAuthProvider` - identity provider REST API
//! - `mock` - Test implementations that don't require external services

mod http_auth_provider;
mod jwt_session_validator;
mod mock;

pub use http_auth_provider::{AuthApiConfig, HttpAuthProvider};
pub use jwt_session_validator::{JwtConfig, JwtSessionValidator};
pub use mock::{MockAuthProvider, MockSessionValidator};
