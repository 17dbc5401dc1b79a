use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use jsonwebtoken::DecodingKey;
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::jwks::JwksClient;

/// Process-wide cache of the identity provider's public signing keys.
///
/// Lazily populated: a lookup miss triggers exactly one synchronous refetch
/// of the full document, which replaces the cached map wholesale under the
/// write lock. Concurrent readers observe either the pre- or post-refresh
/// set, never a partially updated one. Racing refreshes are tolerated; the
/// last writer wins and every writer installs a complete set.
#[derive(Clone)]
pub struct KeySetCache {
    keys: Arc<RwLock<HashMap<String, DecodingKey>>>,
    jwks: Option<JwksClient>,
}

impl KeySetCache {
    pub fn new(jwks: JwksClient) -> Self {
        Self {
            keys: Arc::new(RwLock::new(HashMap::new())),
            jwks: Some(jwks),
        }
    }

    /// A cache with no remote source; keys must be inserted manually.
    pub fn fixed() -> Self {
        Self {
            keys: Arc::new(RwLock::new(HashMap::new())),
            jwks: None,
        }
    }

    pub fn jwks_client(&self) -> Option<&JwksClient> {
        self.jwks.as_ref()
    }

    pub fn insert_key(&self, kid: impl Into<String>, key: DecodingKey) {
        let mut guard = self.keys.write().expect("rwlock poisoned");
        guard.insert(kid.into(), key);
    }

    pub fn insert_rsa_pem(&self, kid: impl Into<String>, pem: &[u8]) -> AuthResult<()> {
        let kid = kid.into();
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|err| AuthError::KeySetUnavailable(format!("key '{kid}': {err}")))?;
        self.insert_key(kid, key);
        Ok(())
    }

    pub fn contains(&self, kid: &str) -> bool {
        let guard = self.keys.read().expect("rwlock poisoned");
        guard.contains_key(kid)
    }

    fn lookup(&self, kid: &str) -> Option<DecodingKey> {
        let guard = self.keys.read().expect("rwlock poisoned");
        guard.get(kid).cloned()
    }

    /// Resolve a decoding key for `kid`, refetching the key set at most once
    /// when the id is absent. A key id still unknown after the refresh means
    /// the token was signed by a key the provider does not publish.
    pub async fn get_key(&self, kid: &str) -> AuthResult<DecodingKey> {
        if let Some(key) = self.lookup(kid) {
            return Ok(key);
        }

        let refreshed = self.refresh().await?;
        debug!(kid, count = refreshed, "refreshed key set on cache miss");

        self.lookup(kid)
            .ok_or_else(|| AuthError::KeyNotFound(kid.to_owned()))
    }

    /// Fetch the key set document and replace the cache wholesale.
    pub async fn refresh(&self) -> AuthResult<usize> {
        let jwks = self
            .jwks
            .as_ref()
            .ok_or_else(|| AuthError::KeySetUnavailable("no JWKS source configured".into()))?;

        let keys = jwks.fetch().await?;
        let count = keys.len();

        let mut guard = self.keys.write().expect("rwlock poisoned");
        guard.clear();
        for (kid, key) in keys {
            guard.insert(kid, key);
        }
        Ok(count)
    }
}
