//! Scripted provider shared by gateway and orchestrator tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::Stream;

use shurahub_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    StreamEvent, Usage,
};

use super::provider::LlmProvider;

#[derive(Clone)]
pub(crate) enum StreamScript {
    /// Reports `model` (or the requested model) then yields each chunk in order.
    Chunks {
        model: Option<String>,
        chunks: Vec<String>,
    },
    /// Yields "answer N" where N counts stream calls, reported as the requested model.
    Numbered,
    /// Completes without any content.
    Empty,
    /// Yields the chunks, then errors.
    FailAfter(Vec<String>),
    /// Panics when the stream is requested.
    Panic,
}

#[derive(Clone)]
pub(crate) enum FallbackScript {
    Reply { model: String, text: String },
    Fail,
    Hang,
}

pub(crate) struct ScriptedProvider {
    capabilities: ProviderCapabilities,
    stream: StreamScript,
    fallback: FallbackScript,
    pub stream_calls: Arc<AtomicUsize>,
    pub complete_calls: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new(stream: StreamScript, fallback: FallbackScript) -> Self {
        Self {
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens: 8192,
                max_output_tokens: 1024,
            },
            stream,
            fallback,
            stream_calls: Arc::new(AtomicUsize::new(0)),
            complete_calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn chunks(model: Option<&str>, chunks: &[&str]) -> Self {
        Self::new(
            StreamScript::Chunks {
                model: model.map(str::to_string),
                chunks: chunks.iter().map(|c| c.to_string()).collect(),
            },
            FallbackScript::Fail,
        )
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let script = self.fallback.clone();
        async move {
            match script {
                FallbackScript::Reply { model, text } => Ok(CompletionResponse {
                    id: "resp-fallback".to_string(),
                    content: text,
                    model,
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                }),
                FallbackScript::Fail => Err(LlmError::Provider {
                    message: "upstream unavailable".to_string(),
                }),
                FallbackScript::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(LlmError::Timeout(3600))
                }
            }
        }
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let n = self.stream_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        let script = self.stream.clone();
        if matches!(script, StreamScript::Panic) {
            panic!("scripted provider panicked");
        }

        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Connected);
            match script {
                StreamScript::Chunks { model, chunks } => {
                    let model = model.unwrap_or_else(|| request.model.clone());
                    yield Ok(StreamEvent::ModelReported { model });
                    for text in chunks {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Ok(StreamEvent::Done);
                }
                StreamScript::Numbered => {
                    yield Ok(StreamEvent::ModelReported { model: request.model.clone() });
                    yield Ok(StreamEvent::TextDelta { text: "answer ".to_string() });
                    yield Ok(StreamEvent::TextDelta { text: n.to_string() });
                    yield Ok(StreamEvent::Done);
                }
                StreamScript::Empty => {
                    yield Ok(StreamEvent::Done);
                }
                StreamScript::FailAfter(chunks) => {
                    for text in chunks {
                        yield Ok(StreamEvent::TextDelta { text });
                    }
                    yield Err(LlmError::Stream("connection reset".to_string()));
                }
                StreamScript::Panic => {}
            }
        })
    }
}
