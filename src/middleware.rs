//! Request logging middleware for reqwest.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest_middleware::{Middleware, Next, Result};
use std::time::Instant;

/// Middleware that logs every API call with its outcome and latency.
///
/// Query strings are dropped from the logged URL; location lookups carry
/// credentials there.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogMiddleware;

#[async_trait]
impl Middleware for RequestLogMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<reqwest::Response> {
        let method = req.method().clone();
        let mut url = req.url().clone();
        url.set_query(None);

        let start = Instant::now();
        let result = next.run(req, extensions).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) if response.status().is_success() => {
                debug!("{} {} -> {} in {:?}", method, url, response.status(), elapsed);
            }
            Ok(response) => {
                warn!("{} {} -> {} in {:?}", method, url, response.status(), elapsed);
            }
            Err(err) => {
                warn!("{} {} failed after {:?}: {}", method, url, elapsed, err);
            }
        }

        result
    }
}
