use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwks::JwksClient;
use crate::keyset::KeySetCache;

/// The untrusted parts of a token header needed to pick a verification key.
#[derive(Debug, Clone)]
pub struct TokenHeader {
    pub algorithm: Algorithm,
    pub key_id: String,
}

/// Structural parse of the token header. No signature or claim is trusted at
/// this point; the result only says which key the token claims to be signed
/// with.
pub fn decode_unverified_header(token: &str) -> AuthResult<TokenHeader> {
    let mut segments = token.split('.');
    let well_formed = matches!(
        (segments.next(), segments.next(), segments.next(), segments.next()),
        (Some(header), Some(payload), Some(signature), None)
            if !header.is_empty() && !payload.is_empty() && !signature.is_empty()
    );
    if !well_formed {
        return Err(AuthError::MalformedToken(
            "token is not three dot-separated segments".into(),
        ));
    }

    let header = jsonwebtoken::decode_header(token)
        .map_err(|err| AuthError::MalformedToken(err.to_string()))?;
    let key_id = header
        .kid
        .ok_or_else(|| AuthError::MalformedToken("token header has no kid".into()))?;

    Ok(TokenHeader {
        algorithm: header.alg,
        key_id,
    })
}

/// Verifies a bearer token's signature against the cached key set and
/// validates its registered claims (exp, iss, aud).
#[derive(Clone)]
pub struct TokenVerifier {
    config: AuthConfig,
    keys: KeySetCache,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig, keys: KeySetCache) -> Self {
        Self { config, keys }
    }

    pub fn builder(config: AuthConfig) -> TokenVerifierBuilder {
        TokenVerifierBuilder::new(config)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeySetCache {
        &self.keys
    }

    pub async fn verify(&self, token: &str) -> AuthResult<Claims> {
        let header = decode_unverified_header(token)?;

        // Only RS256 is trusted. Accepting a symmetric algorithm here would
        // let any holder of the public key forge tokens.
        if header.algorithm != Algorithm::RS256 {
            warn!(alg = ?header.algorithm, "rejecting token with untrusted algorithm");
            return Err(AuthError::InvalidSignature);
        }

        let key = self.keys.get_key(&header.key_id).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.set_audience(&[self.config.audience.clone()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = self.config.leeway_seconds.into();

        let token_data = decode::<Value>(token, &key, &validation).map_err(map_jwt_error)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(kid = %header.key_id, subject = %claims.subject, "verified access token");
        Ok(claims)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims(err.to_string()),
        _ => AuthError::MalformedToken(err.to_string()),
    }
}

pub struct TokenVerifierBuilder {
    config: AuthConfig,
    jwks: Option<JwksClient>,
    seed_keys: Vec<(String, DecodingKey)>,
}

impl TokenVerifierBuilder {
    fn new(config: AuthConfig) -> Self {
        Self {
            config,
            jwks: None,
            seed_keys: Vec::new(),
        }
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks = Some(JwksClient::new(url));
        self
    }

    pub fn with_jwks_client(mut self, client: JwksClient) -> Self {
        self.jwks = Some(client);
        self
    }

    pub fn with_decoding_key(mut self, kid: impl Into<String>, key: DecodingKey) -> Self {
        self.seed_keys.push((kid.into(), key));
        self
    }

    pub fn with_rsa_pem(mut self, kid: impl Into<String>, pem: &[u8]) -> AuthResult<Self> {
        let kid = kid.into();
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|err| AuthError::KeySetUnavailable(format!("key '{kid}': {err}")))?;
        self.seed_keys.push((kid, key));
        Ok(self)
    }

    /// Construct the verifier. The key cache starts out empty apart from
    /// seeded keys; the first unresolved kid triggers the initial JWKS fetch.
    pub fn build(self) -> TokenVerifier {
        let cache = match self.jwks {
            Some(client) => KeySetCache::new(client),
            None => KeySetCache::fixed(),
        };
        for (kid, key) in self.seed_keys {
            cache.insert_key(kid, key);
        }
        TokenVerifier::new(self.config, cache)
    }
}
