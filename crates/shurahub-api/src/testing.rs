//! Test fixtures shared by the session and router tests.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::Stream;

use shurahub_core::debate::orchestrator::DebateOrchestrator;
use shurahub_core::debate::persistence::PersistenceSink;
use shurahub_core::debate::selection::ModelPool;
use shurahub_core::llm::box_provider::BoxLlmProvider;
use shurahub_core::llm::gateway::{GatewayOptions, ModelGateway};
use shurahub_core::llm::provider::LlmProvider;
use shurahub_core::repository::debate::DebateRepository;
use shurahub_types::config::{ContextSettings, DebateSettings};
use shurahub_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    StreamEvent, Usage,
};

/// Streams "considered " + "answer" under the requested model.
pub struct EchoProvider {
    capabilities: ProviderCapabilities,
}

impl EchoProvider {
    pub fn new() -> Self {
        Self {
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens: 8192,
                max_output_tokens: 1024,
            },
        }
    }
}

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            id: "r".to_string(),
            content: "fallback".to_string(),
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::ModelReported { model: request.model.clone() });
            yield Ok(StreamEvent::TextDelta { text: "considered ".to_string() });
            yield Ok(StreamEvent::TextDelta { text: "answer".to_string() });
            yield Ok(StreamEvent::Done);
        })
    }
}

/// Orchestrator over [`EchoProvider`] with pool `[m1, m2, m3]`.
pub fn echo_orchestrator<R: DebateRepository + 'static>(repo: Arc<R>) -> DebateOrchestrator<R> {
    let options = GatewayOptions {
        fallback_timeout: Duration::from_secs(5),
        placeholder_model: "gemma-7b-it".to_string(),
        channel_capacity: 16,
        max_tokens: 256,
        temperature: None,
    };
    DebateOrchestrator::new(
        ModelGateway::new(Arc::new(BoxLlmProvider::new(EchoProvider::new())), options),
        ModelPool::new(vec!["m1".into(), "m2".into(), "m3".into()]).unwrap(),
        PersistenceSink::new(repo),
        DebateSettings::default(),
        ContextSettings::default(),
    )
}
