//! Session Registry
//!
//! Caches one provider client per configuration, keyed by the configuration's
//! fingerprint. Repeated lookups with an equal configuration return the same
//! client, so its held token is reused across callers.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

use crate::error::PaymentResult;
use crate::provider::PaymentProvider;
use crate::types::PaymentConfig;

/// Number of sessions kept before the least recently used one is evicted.
pub const DEFAULT_SESSION_CAPACITY: usize = 16;

/// Bounded LRU map from configuration fingerprint to client.
pub struct SessionRegistry {
    sessions: Mutex<LruCache<String, PaymentProvider>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the session for `config`, building it with the default transport
    /// on first use.
    pub fn get_or_create(&self, config: &PaymentConfig) -> PaymentResult<PaymentProvider> {
        self.get_or_insert_with(config, PaymentProvider::from_config)
    }

    /// Return the session for `config`, building it with `build` on first use.
    ///
    /// The configuration is validated before anything else; an invalid one
    /// leaves the registry untouched. A failed build stores nothing.
    pub fn get_or_insert_with<F>(
        &self,
        config: &PaymentConfig,
        build: F,
    ) -> PaymentResult<PaymentProvider>
    where
        F: FnOnce(&PaymentConfig) -> PaymentResult<PaymentProvider>,
    {
        config.validate()?;
        let key = config.fingerprint();

        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get(&key) {
            return Ok(existing.clone());
        }

        let provider = build(config)?;
        debug!(provider = provider.name(), "created session");
        if let Some((evicted, _)) = sessions.push(key, provider.clone()) {
            debug!(fingerprint = %evicted, "evicted least recently used session");
        }
        Ok(provider)
    }

    /// Existing session for `config`, if any.
    pub fn get(&self, config: &PaymentConfig) -> Option<PaymentProvider> {
        self.sessions.lock().get(&config.fingerprint()).cloned()
    }

    pub fn remove(&self, config: &PaymentConfig) -> Option<PaymentProvider> {
        self.sessions.lock().pop(&config.fingerprint())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    pub fn clear(&self) {
        self.sessions.lock().clear();
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sessions = self.sessions.lock();
        f.debug_struct("SessionRegistry")
            .field("len", &sessions.len())
            .field("capacity", &sessions.cap())
            .finish()
    }
}
