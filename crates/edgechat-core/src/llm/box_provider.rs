//! BoxCompletionProvider -- object-safe dynamic dispatch wrapper for
//! CompletionProvider.
//!
//! 1. Define an object-safe `CompletionProviderDyn` trait with boxed futures
//! 2. Blanket-impl `CompletionProviderDyn` for all `T: CompletionProvider`
//! 3. `BoxCompletionProvider` wraps `Box<dyn CompletionProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use edgechat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::provider::CompletionProvider;

/// Object-safe version of [`CompletionProvider`] with boxed futures.
pub trait CompletionProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>>;

    fn health_check_boxed(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

impl<T: CompletionProvider> CompletionProviderDyn for T {
    fn name(&self) -> &str {
        CompletionProvider::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }

    fn health_check_boxed(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(self.health_check())
    }
}

/// Type-erased completion provider.
///
/// Since `CompletionProvider` uses RPITIT it cannot be a trait object
/// directly. `BoxCompletionProvider` delegates to the inner
/// `CompletionProviderDyn` and itself implements `CompletionProvider`, so it
/// can be handed to anything generic over the trait.
pub struct BoxCompletionProvider {
    inner: Box<dyn CompletionProviderDyn + Send + Sync>,
}

impl BoxCompletionProvider {
    /// Wrap a concrete `CompletionProvider` in a type-erased box.
    pub fn new<T: CompletionProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }
}

impl CompletionProvider for BoxCompletionProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check_boxed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use edgechat_types::llm::SamplingParams;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "deepseek-chat".to_string(),
            system: "be brief".to_string(),
            messages: vec![],
            params: SamplingParams::for_model("deepseek-chat", 0.7),
        }
    }

    #[tokio::test]
    async fn test_box_provider_delegates() {
        let scripted = ScriptedProvider::new();
        scripted.push_ok("boxed reply");
        let boxed = BoxCompletionProvider::new(scripted.clone());

        assert_eq!(CompletionProvider::name(&boxed), "scripted");
        let response = CompletionProvider::complete(&boxed, &request()).await.unwrap();
        assert_eq!(response.content, "boxed reply");
        assert_eq!(scripted.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_box_provider_health_check() {
        let scripted = ScriptedProvider::new();
        let boxed = BoxCompletionProvider::new(scripted.clone());
        assert!(boxed.health_check().await);

        scripted.set_healthy(false);
        assert!(!boxed.health_check().await);
    }
}
