use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID stored as a request extension and echoed on the response.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuses a caller-supplied id unless it is blank; otherwise a `UUIDv4`.
    fn for_request(req: &Request) -> Self {
        let supplied = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty());
        Self(supplied.map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned))
    }
}

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    admitted: usize,
}

/// Fixed-window budget shared by product writes and the contact form.
///
/// One budget covers every limited route, so a burst of contact messages
/// also delays catalogue edits until the window rolls over.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    budget: usize,
    period: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(budget: usize, period: Duration) -> Self {
        Self {
            budget,
            period,
            window: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    /// `CRYSTAL_RATE_LIMIT_PER_MINUTE` maps straight onto this.
    #[must_use]
    pub fn per_minute(budget: usize) -> Self {
        Self::new(budget, Duration::from_secs(60))
    }

    /// Counts one request against the current window, opening a new window
    /// once the period has elapsed. Returns `false` when the budget is spent.
    async fn admit(&self) -> bool {
        let mut window = self.window.lock().await;
        if window.opened_at.elapsed() >= self.period {
            window.opened_at = Instant::now();
            window.admitted = 0;
        }
        if window.admitted >= self.budget {
            return false;
        }
        window.admitted += 1;
        true
    }
}

/// Attaches a [`RequestId`] to the request and an `x-request-id` header to
/// the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::for_request(&req);
    let header = HeaderValue::from_str(&id.0).ok();
    req.extensions_mut().insert(id);

    let mut res = next.run(req).await;
    if let Some(value) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Rejects limited routes with `rate_limited` once the window budget is spent.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.admit().await {
        return next.run(req).await;
    }

    let rid = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();
    tracing::warn!(
        request_id = %rid,
        method = %req.method(),
        path = %req.uri().path(),
        budget = rate_limit.budget,
        "write rate limit exceeded"
    );
    ApiError::new(rid, "rate_limited", "too many write requests, try again shortly")
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_id(id: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/api/v1/contact");
        if let Some(id) = id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn budget_is_spent_then_refused() {
        let limiter = RateLimitState::per_minute(2);
        assert!(limiter.admit().await);
        assert!(limiter.admit().await);
        assert!(!limiter.admit().await);
        assert_eq!(limiter.window.lock().await.admitted, 2);
    }

    #[tokio::test]
    async fn elapsed_period_opens_a_new_window() {
        let limiter = RateLimitState::new(1, Duration::ZERO);
        assert!(limiter.admit().await);
        assert!(limiter.admit().await);
    }

    #[tokio::test]
    async fn clones_share_one_budget() {
        let contact = RateLimitState::per_minute(1);
        let products = contact.clone();
        assert!(contact.admit().await);
        assert!(!products.admit().await);
    }

    #[test]
    fn request_id_keeps_supplied_value() {
        let id = RequestId::for_request(&request_with_id(Some(" order-42 ")));
        assert_eq!(id.0, "order-42");
    }

    #[test]
    fn blank_or_missing_request_id_is_generated() {
        for req in [request_with_id(Some("  ")), request_with_id(None)] {
            let id = RequestId::for_request(&req);
            assert!(Uuid::parse_str(&id.0).is_ok(), "{}", id.0);
        }
    }
}
