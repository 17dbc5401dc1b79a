use std::time::Duration;

use jsonwebtoken::DecodingKey;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AuthError, AuthResult};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches the identity provider's published key set document.
///
/// A slow or unreachable provider degrades to a fast `KeySetUnavailable`
/// failure via the bounded request timeout rather than stalling the request.
#[derive(Clone)]
pub struct JwksClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl JwksClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One GET of the full key set document, decoded into `(kid, key)` pairs.
    ///
    /// Entries that cannot back an RS256 verification key (non-RSA key type,
    /// missing kid or RSA components) are skipped; a document that cannot be
    /// fetched or parsed at all is `KeySetUnavailable`.
    pub async fn fetch(&self) -> AuthResult<Vec<(String, DecodingKey)>> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| AuthError::KeySetUnavailable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let body: JwksResponse = response
            .json()
            .await
            .map_err(|err| AuthError::KeySetUnavailable(err.to_string()))?;

        let mut keys = Vec::new();
        for entry in body.keys.into_iter() {
            let Some(kid) = entry.kid else {
                warn!(jwks_url = %self.url, "skipping JWKS entry without kid");
                continue;
            };
            let kty = entry.kty.unwrap_or_else(|| "RSA".to_string());
            if kty != "RSA" {
                warn!(kid, kty, "skipping non-RSA JWKS entry");
                continue;
            }
            if let Some(alg) = entry.alg.as_deref() {
                if alg != "RS256" {
                    warn!(kid, alg, "skipping JWKS entry with unsupported alg");
                    continue;
                }
            }
            let (Some(modulus), Some(exponent)) = (entry.n, entry.e) else {
                warn!(kid, "skipping JWKS entry missing RSA components");
                continue;
            };

            let key = DecodingKey::from_rsa_components(&modulus, &exponent)
                .map_err(|err| AuthError::KeySetUnavailable(format!("key '{kid}': {err}")))?;
            keys.push((kid, key));
        }

        Ok(keys)
    }
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkEntry>,
}

#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    kty: Option<String>,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn fetch_skips_unusable_entries() {
        let server = MockServer::start();
        let body = serde_json::json!({
            "keys": [
                { "kty": "EC", "kid": "ec-key", "alg": "ES256" },
                { "kty": "RSA", "alg": "RS256", "n": "AQAB", "e": "AQAB" },
                { "kty": "RSA", "kid": "partial" }
            ]
        });
        server.mock(|when, then| {
            when.method(GET).path("/jwks");
            then.status(200)
                .header("content-type", "application/json")
                .body(body.to_string());
        });

        let client = JwksClient::new(format!("{}/jwks", server.base_url()));
        let keys = client.fetch().await.expect("fetch succeeds");
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn http_error_is_key_set_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/jwks");
            then.status(503);
        });

        let client = JwksClient::new(format!("{}/jwks", server.base_url()));
        let err = client.fetch().await.map(|_| ()).expect_err("should fail");
        assert!(matches!(err, AuthError::KeySetUnavailable(_)));
    }

    #[tokio::test]
    async fn malformed_document_is_key_set_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/jwks");
            then.status(200)
                .header("content-type", "application/json")
                .body("{\"not\": \"a jwks\"}");
        });

        let client = JwksClient::new(format!("{}/jwks", server.base_url()));
        let err = client.fetch().await.map(|_| ()).expect_err("should fail");
        assert!(matches!(err, AuthError::KeySetUnavailable(_)));
    }
}
