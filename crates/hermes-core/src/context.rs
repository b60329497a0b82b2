//! Request context types.
//!
//! The [`RequestContext`] carries the per-request cancellation signal,
//! deadline, request ID and typed values. Response writers forward
//! [`deadline`](RequestContext::deadline), [`done`](RequestContext::done),
//! [`err`](RequestContext::err) and [`value`](RequestContext::value) to it
//! unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Correlates the log lines of one request.
///
/// Fresh IDs are UUID v7, so they sort by creation time. An ID forwarded by
/// a proxy in `X-Request-Id` can be parsed with [`str::parse`] and kept.
///
/// ```
/// use hermes_core::RequestId;
///
/// let upstream: RequestId = "0191e9a8-6f3c-7c3e-9d9b-5f1e2a4b6c8d".parse().unwrap();
/// assert_eq!(upstream.to_string(), "0191e9a8-6f3c-7c3e-9d9b-5f1e2a4b6c8d");
/// assert!("req-42".parse::<RequestId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a time-ordered ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context was cancelled explicitly, or its parent was.
    #[error("context canceled")]
    Canceled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Per-request cancellation, deadline and value storage.
///
/// Cloning a context shares its cancellation signal: cancelling any clone
/// cancels them all. Use [`child`](Self::child) for a context that can be
/// cancelled independently of its parent.
///
/// # Example
///
/// ```
/// use hermes_core::{ContextError, RequestContext};
///
/// let ctx = RequestContext::new();
/// assert!(ctx.err().is_none());
///
/// ctx.cancel();
/// assert_eq!(ctx.err(), Some(ContextError::Canceled));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    cancel: CancellationToken,
    deadline: Option<Instant>,
    values: http::Extensions,
    received_at: Instant,
}

impl RequestContext {
    /// Creates a context with a fresh request ID, no deadline and no values.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            cancel: CancellationToken::new(),
            deadline: None,
            values: http::Extensions::new(),
            received_at: Instant::now(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the deadline, if one is set.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns a context with the given deadline.
    ///
    /// A deadline later than the current one is ignored; a context never
    /// outlives the deadline it was given.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Returns a context whose deadline is `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Cancels this context and every child derived from it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a context that is cancelled with this one but can also be
    /// cancelled on its own.
    ///
    /// The child inherits the request ID, deadline and values.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            request_id: self.request_id,
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
            values: self.values.clone(),
            received_at: self.received_at,
        }
    }

    /// Returns the underlying cancellation token.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.cancel.cancelled() => {}
                    () = tokio::time::sleep_until(deadline.into()) => {}
                }
            }
            None => self.cancel.cancelled().await,
        }
    }

    /// Returns why the context is done, or `None` while it is still live.
    ///
    /// Cancellation takes precedence over an expired deadline.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if self.cancel.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Looks up a value by type.
    #[must_use]
    pub fn value<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    /// Stores a value, returning the previous value of the same type.
    pub fn insert_value<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values.insert(value)
    }

    /// Returns a context with the value stored.
    #[must_use]
    pub fn with_value<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.insert(value);
        self
    }

    /// Time since the request was received.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tenant(&'static str);

    #[test]
    fn test_fresh_request_ids_are_v7() {
        let id = RequestId::new();
        assert_eq!(id.0.get_version_num(), 7);
        assert_ne!(id, RequestId::new());
    }

    #[test]
    fn test_request_id_from_header_value() {
        let id: RequestId = " 0191e9a8-6f3c-7c3e-9d9b-5f1e2a4b6c8d ".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0191e9a8-6f3c-7c3e-9d9b-5f1e2a4b6c8d\"");
        assert!("".parse::<RequestId>().is_err());
    }

    #[test]
    fn test_fresh_context_is_live() {
        let ctx = RequestContext::new();
        assert!(ctx.deadline().is_none());
        assert!(ctx.err().is_none());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let ctx = RequestContext::new();
        let clone = ctx.clone();
        clone.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
    }

    #[test]
    fn test_child_follows_parent_but_not_the_reverse() {
        let parent = RequestContext::new();
        let child = parent.child();
        child.cancel();
        assert!(parent.err().is_none());

        let other = parent.child();
        parent.cancel();
        assert_eq!(other.err(), Some(ContextError::Canceled));
        assert_eq!(other.request_id(), parent.request_id());
    }

    #[test]
    fn test_expired_deadline() {
        let ctx = RequestContext::new().with_deadline(Instant::now());
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[test]
    fn test_cancel_wins_over_deadline() {
        let ctx = RequestContext::new().with_deadline(Instant::now());
        ctx.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
    }

    #[test]
    fn test_deadline_only_shrinks() {
        let soon = Instant::now() + Duration::from_secs(1);
        let ctx = RequestContext::new()
            .with_deadline(soon)
            .with_timeout(Duration::from_secs(60));
        assert_eq!(ctx.deadline(), Some(soon));
    }

    #[test]
    fn test_values() {
        let mut ctx = RequestContext::new().with_value(Tenant("acme"));
        assert_eq!(ctx.value::<Tenant>(), Some(&Tenant("acme")));
        assert!(ctx.value::<u32>().is_none());

        let previous = ctx.insert_value(Tenant("globex"));
        assert_eq!(previous, Some(Tenant("acme")));
        assert_eq!(ctx.child().value::<Tenant>(), Some(&Tenant("globex")));
    }

    #[tokio::test]
    async fn test_done_resolves_on_cancel() {
        let ctx = RequestContext::new();
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.done().await });
        ctx.cancel();
        handle.await.expect("task should not panic");
    }

    #[tokio::test]
    async fn test_done_resolves_on_deadline() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(10));
        tokio::time::timeout(Duration::from_secs(5), ctx.done())
            .await
            .expect("deadline should fire");
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }
}
