//! Judgment provider backed by a text-completion model.

use async_trait::async_trait;
use tracing::debug;

use super::{Judgment, JudgmentProvider, Persona};
use crate::error::ProviderError;
use crate::parsing::{parse_judgment, render_prompt};
use crate::request::PurchaseRequest;

/// A client that sends a prompt to a model and returns its raw reply.
///
/// The transport (HTTP, SDK, local runtime) lives outside this crate.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Completes `prompt` with the model identified by `model`.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}

/// Adapts a [`CompletionClient`] into a [`JudgmentProvider`].
///
/// Renders the request and persona into a prompt, sends it to the
/// persona's model and parses the reply. Unparseable replies abstain
/// rather than fail.
pub struct PromptedProvider<C> {
    client: C,
}

impl<C: CompletionClient> PromptedProvider<C> {
    /// Wraps a completion client.
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: CompletionClient> JudgmentProvider for PromptedProvider<C> {
    async fn judge(
        &self,
        request: &PurchaseRequest,
        persona: &Persona,
    ) -> Result<Judgment, ProviderError> {
        let prompt = render_prompt(request, persona);
        let reply = self.client.complete(&persona.model, &prompt).await?;
        debug!(role = %persona.role, model = %persona.model, "received {} byte reply", reply.len());
        Ok(parse_judgment(&reply))
    }
}
