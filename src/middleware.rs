//! Ordered request interceptors.
//!
//! An interceptor inspects the request head before the handler runs. It may
//! enrich request extensions and pass, or fail and short-circuit the chain.
//!
//! # Example
//!
//! ```rust,ignore
//! let chain = Interceptors::new().with(AuthGate::new(tokens));
//! let routes = Router::new()
//!     .route("/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(chain, Interceptors::middleware));
//! ```

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::{Result, WardenError};

#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Return `Ok(())` to let the request continue.
    async fn intercept(&self, parts: &mut Parts) -> Result<()>;
}

/// An ordered list of interceptors, cheap to clone.
#[derive(Clone, Default)]
pub struct Interceptors {
    chain: Vec<Arc<dyn Interceptor>>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interceptor. Interceptors run in the order they were added.
    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.chain.push(Arc::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Run every interceptor in order, stopping at the first failure.
    pub async fn run(&self, parts: &mut Parts) -> Result<()> {
        for interceptor in &self.chain {
            interceptor.intercept(parts).await?;
        }
        Ok(())
    }

    /// Axum middleware function; use with `from_fn_with_state`.
    pub async fn middleware(
        State(chain): State<Interceptors>,
        request: Request,
        next: Next,
    ) -> std::result::Result<Response, WardenError> {
        let (mut parts, body) = request.into_parts();
        chain.run(&mut parts).await?;
        Ok(next.run(Request::from_parts(parts, body)).await)
    }
}
