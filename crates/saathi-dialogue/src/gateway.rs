//! The chat-completion seam between the orchestrator and LLM providers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use saathi_types::{ChatOptions, Turn};

use crate::error::{GatewayError, UpstreamError};

/// Turns a full history into one assistant reply.
///
/// Implementations make exactly one provider call per invocation, never
/// retry, never mutate `history`, and return the reply trimmed of
/// surrounding whitespace. A missing credential must fail fast with
/// [`GatewayError::NotConfigured`] without touching the network.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Stable provider name used in logs.
    fn name(&self) -> &str;

    /// Whether a credential is present. Unconfigured gateways always fail
    /// with [`GatewayError::NotConfigured`].
    fn is_configured(&self) -> bool;

    async fn complete(&self, history: &[Turn], options: &ChatOptions)
        -> Result<String, GatewayError>;
}

#[async_trait]
impl<G: ChatGateway + ?Sized> ChatGateway for Arc<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }

    async fn complete(
        &self,
        history: &[Turn],
        options: &ChatOptions,
    ) -> Result<String, GatewayError> {
        (**self).complete(history, options).await
    }
}

/// Gateway used when no provider is configured at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGateway;

#[async_trait]
impl ChatGateway for UnconfiguredGateway {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(
        &self,
        _history: &[Turn],
        _options: &ChatOptions,
    ) -> Result<String, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}

/// Wraps a gateway with an external deadline.
///
/// When the deadline expires the inner call is dropped and the turn fails
/// with [`UpstreamError::Deadline`], which the orchestrator recovers like any
/// other upstream failure.
#[derive(Debug, Clone)]
pub struct DeadlineGateway<G> {
    inner: G,
    deadline: Duration,
}

impl<G> DeadlineGateway<G> {
    pub fn new(inner: G, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[async_trait]
impl<G: ChatGateway> ChatGateway for DeadlineGateway<G> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    async fn complete(
        &self,
        history: &[Turn],
        options: &ChatOptions,
    ) -> Result<String, GatewayError> {
        match tokio::time::timeout(self.deadline, self.inner.complete(history, options)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Deadline(self.deadline).into()),
        }
    }
}
