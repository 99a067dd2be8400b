//! OAuth access token lifecycle.
//!
//! [`TokenManager`] owns the adapter's current [`AccessToken`] and refreshes it
//! when it is missing or within the safety margin of its expiry.
//!
//! Refreshes are single-flight: while an exchange is in progress, every other
//! caller awaits that same exchange instead of starting its own, and all of
//! them observe the same outcome. A failed exchange leaves the manager
//! without a token so the next call starts a fresh one.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::error::DarajaError;
use crate::proto::TokenResponse;
use crate::timestamp::Clock;

/// Tokens are refreshed this long before their reported expiry.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// An issued bearer token and its absolute expiry.
///
/// The token value is only readable inside this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_in: u64,
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// Builds a token from an exchange response received at `issued_at`.
    fn issue(response: TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let lifetime = i64::try_from(response.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            value: response.access_token,
            expires_in: response.expires_in,
            expires_at: issued_at
                .checked_add_signed(lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Lifetime reported by the provider, in seconds.
    #[must_use]
    pub const fn expires_in(&self) -> u64 {
        self.expires_in
    }

    /// Absolute expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `Authorization` header value.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// Whether the token may still be used at `now`, keeping `margin` in reserve.
    fn is_usable_at(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        self.expires_at
            .checked_sub_signed(margin)
            .is_some_and(|deadline| now < deadline)
    }
}

/// An exchange in flight, shared by every caller waiting on it.
type Exchange = Shared<BoxFuture<'static, Result<AccessToken, DarajaError>>>;

enum TokenState {
    NoToken,
    HasToken(AccessToken),
    Refreshing(Exchange),
}

/// Owns the adapter's access token and serializes refreshes.
pub struct TokenManager {
    state: Mutex<TokenState>,
    clock: Arc<dyn Clock>,
    margin: TimeDelta,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.lock() {
            TokenState::NoToken => "no_token",
            TokenState::HasToken(_) => "has_token",
            TokenState::Refreshing(_) => "refreshing",
        };
        f.debug_struct("TokenManager")
            .field("state", &state)
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Creates a manager with no token and the default safety margin.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_margin(clock, DEFAULT_SAFETY_MARGIN)
    }

    /// Creates a manager with no token and a custom safety margin.
    #[must_use]
    pub fn with_margin(clock: Arc<dyn Clock>, margin: Duration) -> Self {
        Self {
            state: Mutex::new(TokenState::NoToken),
            clock,
            margin: TimeDelta::from_std(margin).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Returns a token that is valid for at least the safety margin.
    ///
    /// When the current token is missing or stale, `exchange` is invoked to
    /// start a new OAuth exchange, unless one is already in flight, in which
    /// case this call joins it.
    ///
    /// # Errors
    ///
    /// Returns the exchange's error to every caller that awaited it.
    pub async fn ensure_valid<F, Fut>(&self, exchange: F) -> Result<AccessToken, DarajaError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenResponse, DarajaError>> + Send + 'static,
    {
        let flight = {
            let mut state = self.lock();
            if let TokenState::HasToken(token) = &*state
                && token.is_usable_at(self.clock.now(), self.margin)
            {
                return Ok(token.clone());
            }
            self.join_or_start(&mut state, exchange)
        };
        self.complete(flight).await
    }

    /// Replaces the current token with a freshly exchanged one.
    ///
    /// Joins an exchange that is already in flight rather than starting a
    /// second one.
    ///
    /// # Errors
    ///
    /// Returns the exchange's error.
    pub async fn refresh<F, Fut>(&self, exchange: F) -> Result<AccessToken, DarajaError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenResponse, DarajaError>> + Send + 'static,
    {
        let flight = {
            let mut state = self.lock();
            self.join_or_start(&mut state, exchange)
        };
        self.complete(flight).await
    }

    /// Drops the current token. An exchange in flight is left untouched.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        if matches!(&*state, TokenState::HasToken(_)) {
            *state = TokenState::NoToken;
        }
    }

    /// Returns `true` if a token is cached and usable now.
    #[must_use]
    pub fn has_valid_token(&self) -> bool {
        match &*self.lock() {
            TokenState::HasToken(token) => token.is_usable_at(self.clock.now(), self.margin),
            _ => false,
        }
    }

    fn join_or_start<F, Fut>(&self, state: &mut TokenState, exchange: F) -> Exchange
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TokenResponse, DarajaError>> + Send + 'static,
    {
        if let TokenState::Refreshing(flight) = state {
            return flight.clone();
        }

        #[cfg(feature = "telemetry")]
        tracing::debug!("daraja.token.exchange_started");

        let clock = Arc::clone(&self.clock);
        let pending = exchange();
        let flight = async move {
            let response = pending.await?;
            Ok(AccessToken::issue(response, clock.now()))
        }
        .boxed()
        .shared();
        *state = TokenState::Refreshing(flight.clone());
        flight
    }

    async fn complete(&self, flight: Exchange) -> Result<AccessToken, DarajaError> {
        let result = flight.clone().await;
        let mut state = self.lock();
        if let TokenState::Refreshing(current) = &*state
            && current.ptr_eq(&flight)
        {
            *state = match &result {
                Ok(token) => {
                    #[cfg(feature = "telemetry")]
                    tracing::info!(expires_at = %token.expires_at, "daraja.token.exchange_succeeded");
                    TokenState::HasToken(token.clone())
                }
                Err(_err) => {
                    #[cfg(feature = "telemetry")]
                    tracing::error!(error = %_err, "daraja.token.exchange_failed");
                    TokenState::NoToken
                }
            };
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Clock whose instant can be moved by the test.
    #[derive(Debug)]
    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn starting_at(instant: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(instant)))
        }

        fn set(&self, instant: DateTime<Utc>) {
            *self.0.lock().unwrap() = instant;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    /// Returns an exchange factory that counts invocations and hands out
    /// `token-<n>` values valid for one hour.
    fn counting_exchange(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<TokenResponse, DarajaError>> + use<> {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(TokenResponse {
                    access_token: format!("token-{n}"),
                    expires_in: 3600,
                })
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_first_call_exchanges_then_reuses() {
        let clock = ManualClock::starting_at(t0());
        let manager = TokenManager::new(clock.clone());
        let calls = Arc::new(AtomicUsize::new(0));

        let first = manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        assert_eq!(first.bearer(), "Bearer token-1");
        assert_eq!(first.expires_at(), t0() + TimeDelta::seconds(3600));

        clock.set(t0() + TimeDelta::seconds(3600 - 61));
        let second = manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refreshes_at_margin() {
        let clock = ManualClock::starting_at(t0());
        let manager = TokenManager::new(clock.clone());
        let calls = Arc::new(AtomicUsize::new(0));

        manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        clock.set(t0() + TimeDelta::seconds(3600 - 60));
        let refreshed = manager.ensure_valid(counting_exchange(&calls)).await.unwrap();

        assert_eq!(refreshed.bearer(), "Bearer token-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let clock = ManualClock::starting_at(t0());
        let manager = Arc::new(TokenManager::new(clock.clone()));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let exchange = counting_exchange(&calls);
                tokio::spawn(async move { manager.ensure_valid(exchange).await })
            })
            .collect();

        for task in futures_util::future::join_all(tasks).await {
            assert_eq!(task.unwrap().unwrap().bearer(), "Bearer token-1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_refresh_of_stale_token_is_single_flight() {
        let clock = ManualClock::starting_at(t0());
        let manager = Arc::new(TokenManager::new(clock.clone()));
        let calls = Arc::new(AtomicUsize::new(0));
        manager.ensure_valid(counting_exchange(&calls)).await.unwrap();

        clock.set(t0() + TimeDelta::seconds(3600));
        let waiters = (0..8).map(|_| manager.ensure_valid(counting_exchange(&calls)));
        let results = futures_util::future::join_all(waiters).await;

        assert!(results.iter().all(|r| r.as_ref().unwrap().bearer() == "Bearer token-2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter_and_resets() {
        let clock = ManualClock::starting_at(t0());
        let manager = TokenManager::new(clock.clone());
        let failures = Arc::new(AtomicUsize::new(0));

        let failing = {
            let failures = Arc::clone(&failures);
            move || {
                failures.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err::<TokenResponse, _>(DarajaError::from_status(
                        http::StatusCode::BAD_REQUEST,
                        r#"{"errorCode":"400.008.01","errorMessage":"Invalid Authentication passed"}"#
                            .to_owned(),
                    ))
                }
                .boxed()
            }
        };
        let never_called = || -> BoxFuture<'static, Result<TokenResponse, DarajaError>> {
            unreachable!("joined the in-flight exchange")
        };

        let (a, b) = futures_util::join!(
            manager.ensure_valid(failing),
            manager.ensure_valid(never_called)
        );
        assert_eq!(a.unwrap_err().api_code(), Some("400.008.01"));
        assert_eq!(b.unwrap_err().api_code(), Some("400.008.01"));
        assert_eq!(failures.load(Ordering::SeqCst), 1);
        assert!(!manager.has_valid_token());

        let calls = Arc::new(AtomicUsize::new(0));
        let token = manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        assert_eq!(token.bearer(), "Bearer token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_replaces_fresh_token() {
        let clock = ManualClock::starting_at(t0());
        let manager = TokenManager::new(clock.clone());
        let calls = Arc::new(AtomicUsize::new(0));

        manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        let forced = manager.refresh(counting_exchange(&calls)).await.unwrap();
        assert_eq!(forced.bearer(), "Bearer token-2");

        let cached = manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        assert_eq!(cached, forced);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_exchange() {
        let clock = ManualClock::starting_at(t0());
        let manager = TokenManager::new(clock.clone());
        let calls = Arc::new(AtomicUsize::new(0));

        manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        assert!(manager.has_valid_token());
        manager.invalidate();
        assert!(!manager.has_valid_token());
        manager.ensure_valid(counting_exchange(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = AccessToken::issue(
            TokenResponse {
                access_token: "s3cr3t".to_owned(),
                expires_in: 3599,
            },
            t0(),
        );
        assert!(!format!("{token:?}").contains("s3cr3t"));
        assert_eq!(token.expires_in(), 3599);
    }
}
