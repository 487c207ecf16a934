// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token bucket rate limiting for chain RPC clients.
//!
//! Public endpoints (Base, BSC) reject bursts from concurrent extraction
//! workers; this layer spaces requests client-side so workers queue instead
//! of burning retries on HTTP 429.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use tokio::sync::Mutex;
use tower::Layer;

/// A Tower layer that applies rate limiting to requests.
///
/// The bucket is shared by every service the layer produces, so all workers
/// using one chain's client draw from the same budget.
///
/// # Example
///
/// ```rust
/// use swapscan::transport::RateLimitLayer;
/// use std::time::Duration;
///
/// // 4 requests per second
/// let layer = RateLimitLayer::per_second(4);
///
/// // 100 requests per minute
/// let layer = RateLimitLayer::new(100, Duration::from_secs(60));
/// ```
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    bucket: Arc<Mutex<TokenBucket>>,
}

impl RateLimitLayer {
    /// Allow `requests` per `period`.
    pub fn new(requests: u32, period: Duration) -> Self {
        Self {
            bucket: Arc::new(Mutex::new(TokenBucket::new(requests, period))),
        }
    }

    /// Allow `requests` per second.
    pub fn per_second(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(1))
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RateLimitService {
            service,
            bucket: self.bucket.clone(),
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    capacity: f64,
    tokens: f64,
    /// tokens per nanosecond
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(requests: u32, period: Duration) -> Self {
        let requests = requests.max(1);
        Self {
            capacity: f64::from(requests),
            tokens: f64::from(requests),
            refill_rate: f64::from(requests) / period.as_nanos().max(1) as f64,
            last_refill: Instant::now(),
        }
    }

    /// Take a token, or return how long to wait before one is available.
    fn try_acquire(&mut self) -> Option<Duration> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_nanos() as f64;
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let wait_nanos = (1.0 - self.tokens) / self.refill_rate;
            Some(Duration::from_nanos(wait_nanos as u64))
        }
    }
}

/// A Tower service that waits for a token before forwarding each request.
#[derive(Clone, Debug)]
pub struct RateLimitService<S> {
    service: S,
    bucket: Arc<Mutex<TokenBucket>>,
}

impl<S, Request> tower::Service<Request> for RateLimitService<S>
where
    S: tower::Service<Request> + Clone + Send + 'static,
    S::Future: Send,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let bucket = self.bucket.clone();
        let mut service = self.service.clone();

        Box::pin(async move {
            loop {
                let wait = bucket.lock().await.try_acquire();
                match wait {
                    None => break,
                    Some(duration) => tokio::time::sleep(duration).await,
                }
            }

            service.call(request).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_starts_full() {
        let mut bucket = TokenBucket::new(3, Duration::from_secs(1));
        assert!(bucket.try_acquire().is_none());
        assert!(bucket.try_acquire().is_none());
        assert!(bucket.try_acquire().is_none());
        assert!(bucket.try_acquire().is_some());
    }

    #[test]
    fn test_zero_requests_is_clamped() {
        let mut bucket = TokenBucket::new(0, Duration::from_secs(1));
        assert!(bucket.try_acquire().is_none());
        assert!(bucket.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_bucket_refills() {
        let mut bucket = TokenBucket::new(10, Duration::from_secs(1));
        for _ in 0..10 {
            bucket.try_acquire();
        }

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(bucket.try_acquire().is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_enforces_rate() {
        #[derive(Clone)]
        struct InstantService;

        impl tower::Service<()> for InstantService {
            type Response = ();
            type Error = std::convert::Infallible;
            type Future = std::future::Ready<Result<(), std::convert::Infallible>>;

            fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
                Poll::Ready(Ok(()))
            }

            fn call(&mut self, _req: ()) -> Self::Future {
                std::future::ready(Ok(()))
            }
        }

        let layer = RateLimitLayer::per_second(5);
        let mut service = layer.layer(InstantService);

        let start = Instant::now();
        // The sixth call has to wait for a refill
        for _ in 0..6 {
            tower::Service::call(&mut service, ()).await.unwrap();
        }

        assert!(start.elapsed() >= Duration::from_millis(180));
    }
}
