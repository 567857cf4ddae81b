//! Token Cell
//!
//! Guarded token state. The guard is taken and released inside each method, so
//! no caller can hold it across network I/O of its own.

use chrono::Utc;
use std::future::Future;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::PaymentResult;
use crate::token::RefreshPolicy;
use crate::types::TokenState;

/// Holds at most one token and serializes refreshes of it.
#[derive(Debug, Default)]
pub struct TokenCell {
    state: Mutex<Option<TokenState>>,
}

impl TokenCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the held token.
    pub async fn snapshot(&self) -> Option<TokenState> {
        self.state.lock().await.clone()
    }

    /// Replace the held token.
    pub async fn store(&self, state: TokenState) {
        *self.state.lock().await = Some(state);
    }

    /// Drop the held token.
    pub async fn clear(&self) {
        *self.state.lock().await = None;
    }

    /// `Authorization` header value for the next call, or `None` when no token
    /// has ever been obtained.
    ///
    /// A held token that `policy` marks as stale is replaced by the result of
    /// `refresh` first. Concurrent callers wait on the guard and then observe the
    /// replacement, so one stale token triggers one refresh. When `refresh` fails
    /// the held token is left as it was.
    pub async fn authorization<F, Fut>(
        &self,
        policy: &RefreshPolicy,
        refresh: F,
    ) -> PaymentResult<Option<String>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PaymentResult<TokenState>>,
    {
        let mut guard = self.state.lock().await;

        let stale = guard
            .as_ref()
            .map(|state| policy.needs_refresh(state, Utc::now()))
            .unwrap_or(false);

        if stale {
            debug!("held token is near expiry, refreshing");
            *guard = Some(refresh().await?);
        }

        Ok(guard.as_ref().map(TokenState::authorization_header))
    }

    /// Return a usable token, acquiring one when none is held or the held one is
    /// stale.
    pub async fn ensure_fresh<F, Fut>(
        &self,
        policy: &RefreshPolicy,
        refresh: F,
    ) -> PaymentResult<TokenState>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PaymentResult<TokenState>>,
    {
        let mut guard = self.state.lock().await;

        if let Some(state) = guard.as_ref() {
            if !policy.needs_refresh(state, Utc::now()) {
                return Ok(state.clone());
            }
        }

        let fresh = refresh().await?;
        *guard = Some(fresh.clone());
        Ok(fresh)
    }
}
