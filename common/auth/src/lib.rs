pub mod claims;
pub mod config;
pub mod error;
pub mod gate;
pub mod jwks;
pub mod keyset;
pub mod verifier;

pub use claims::Claims;
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use gate::{bearer_token, ensure_permission, AuthGate};
pub use jwks::JwksClient;
pub use keyset::KeySetCache;
pub use verifier::{decode_unverified_header, TokenHeader, TokenVerifier, TokenVerifierBuilder};
