//! ModelGateway -- one model call for one debate stage.
//!
//! A call runs on its own tokio task so a slow provider never stalls the
//! session that asked for it. The task first streams; if the stream errors or
//! finishes without content it makes exactly one non-streaming request under
//! a timeout, and if that fails too it settles on a sentinel answer. Progress
//! reaches the caller only through a bounded channel, drained via
//! [`StageCall::next_event`].
//!
//! The gateway never returns an error: every provider failure is folded into
//! a [`GatewayOutcome`].

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{Instrument, Span, debug, info_span, warn};

use shurahub_types::config::{GatewaySettings, ProviderSettings};
use shurahub_types::llm::{CompletionRequest, LlmError, Message, StreamEvent};

use super::box_provider::BoxLlmProvider;

/// Tunables for a [`ModelGateway`], built once from configuration.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub fallback_timeout: Duration,
    pub placeholder_model: String,
    pub channel_capacity: usize,
    pub max_tokens: u32,
    pub temperature: Option<f64>,
}

impl GatewayOptions {
    pub fn from_config(gateway: &GatewaySettings, provider: &ProviderSettings) -> Self {
        Self {
            fallback_timeout: Duration::from_secs(gateway.fallback_timeout_secs),
            placeholder_model: gateway.placeholder_model.clone(),
            channel_capacity: gateway.channel_capacity,
            max_tokens: provider.max_tokens,
            temperature: provider.temperature,
        }
    }
}

/// How a stage's final text was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The streaming phase produced content.
    Streamed { text: String, model: String },
    /// Streaming failed or was empty; the fallback request succeeded.
    FallbackUsed { text: String, model: String },
    /// Both phases failed. `text` is the sentinel, `model` the placeholder.
    Failed { text: String, model: String },
}

impl GatewayOutcome {
    pub fn text(&self) -> &str {
        match self {
            GatewayOutcome::Streamed { text, .. }
            | GatewayOutcome::FallbackUsed { text, .. }
            | GatewayOutcome::Failed { text, .. } => text,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            GatewayOutcome::Streamed { model, .. }
            | GatewayOutcome::FallbackUsed { model, .. }
            | GatewayOutcome::Failed { model, .. } => model,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayOutcome::Streamed { .. } => "streamed",
            GatewayOutcome::FallbackUsed { .. } => "fallback",
            GatewayOutcome::Failed { .. } => "failed",
        }
    }

    /// Split into `(text, model)`.
    pub fn into_parts(self) -> (String, String) {
        match self {
            GatewayOutcome::Streamed { text, model }
            | GatewayOutcome::FallbackUsed { text, model }
            | GatewayOutcome::Failed { text, model } => (text, model),
        }
    }
}

/// Message sent from the worker task to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// One streamed chunk, tagged with the model the provider currently reports.
    Delta { text: String, model: String },
    /// Terminal event; nothing follows it.
    Finished(GatewayOutcome),
}

/// Apology substituted when both phases fail.
pub fn sentinel_text(model_id: &str) -> String {
    format!("Sorry, I encountered an error with the {model_id} model.")
}

/// Mediates model calls for debate stages.
pub struct ModelGateway {
    provider: Arc<BoxLlmProvider>,
    options: GatewayOptions,
}

impl ModelGateway {
    pub fn new(provider: Arc<BoxLlmProvider>, options: GatewayOptions) -> Self {
        Self { provider, options }
    }

    /// Start a call for `model_id` on a worker task.
    ///
    /// Dropping the returned [`StageCall`] abandons the worker: its next send
    /// fails and it exits without being joined.
    pub fn call(&self, model_id: &str, messages: Vec<Message>) -> StageCall {
        let request = self.build_request(model_id, messages);
        let (tx, rx) = mpsc::channel(self.options.channel_capacity.max(1));

        let span = info_span!(
            "chat",
            otel.name = %format!("chat {model_id}"),
            gen_ai.operation.name = "chat",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %model_id,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.response.model = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let worker = Worker {
            provider: Arc::clone(&self.provider),
            requested_model: model_id.to_string(),
            placeholder_model: self.options.placeholder_model.clone(),
            fallback_timeout: self.options.fallback_timeout,
        };
        tokio::spawn(worker.run(request, tx).instrument(span));

        StageCall {
            rx,
            requested_model: model_id.to_string(),
            placeholder_model: self.options.placeholder_model.clone(),
            finished: false,
        }
    }

    fn build_request(&self, model_id: &str, messages: Vec<Message>) -> CompletionRequest {
        let cap = self.provider.capabilities().max_output_tokens;
        let max_tokens = if cap > 0 {
            self.options.max_tokens.min(cap)
        } else {
            self.options.max_tokens
        };
        CompletionRequest {
            model: model_id.to_string(),
            messages,
            system: None,
            max_tokens,
            temperature: self.options.temperature,
            stream: true,
        }
    }
}

/// Receiving end of one in-flight model call.
///
/// Yields zero or more [`GatewayEvent::Delta`]s followed by exactly one
/// [`GatewayEvent::Finished`], then `None`.
pub struct StageCall {
    rx: mpsc::Receiver<GatewayEvent>,
    requested_model: String,
    placeholder_model: String,
    finished: bool,
}

impl StageCall {
    pub async fn next_event(&mut self) -> Option<GatewayEvent> {
        if self.finished {
            return None;
        }
        match self.rx.recv().await {
            Some(GatewayEvent::Finished(outcome)) => {
                self.finished = true;
                Some(GatewayEvent::Finished(outcome))
            }
            Some(delta) => Some(delta),
            None => {
                // Worker died (panicked) before reporting.
                self.finished = true;
                warn!(model = %self.requested_model, "model worker ended without a result");
                Some(GatewayEvent::Finished(self.failure()))
            }
        }
    }

    /// The outcome used when no answer could be obtained for this call.
    pub fn failure(&self) -> GatewayOutcome {
        GatewayOutcome::Failed {
            text: sentinel_text(&self.requested_model),
            model: self.placeholder_model.clone(),
        }
    }
}

enum StreamPhase {
    Complete { text: String, model: String },
    Empty,
    Failed(LlmError),
    Abandoned,
}

struct Worker {
    provider: Arc<BoxLlmProvider>,
    requested_model: String,
    placeholder_model: String,
    fallback_timeout: Duration,
}

impl Worker {
    async fn run(self, request: CompletionRequest, tx: mpsc::Sender<GatewayEvent>) {
        let outcome = match self.stream_phase(request.clone(), &tx).await {
            StreamPhase::Complete { text, model } => GatewayOutcome::Streamed { text, model },
            StreamPhase::Abandoned => {
                debug!("session went away mid-stream, abandoning call");
                return;
            }
            StreamPhase::Empty => {
                warn!(model = %self.requested_model, "stream finished without content, falling back");
                if tx.is_closed() {
                    return;
                }
                self.fallback_phase(request).await
            }
            StreamPhase::Failed(e) => {
                warn!(model = %self.requested_model, error = %e, "stream failed, falling back");
                if tx.is_closed() {
                    return;
                }
                self.fallback_phase(request).await
            }
        };

        let span = Span::current();
        span.record("gen_ai.response.model", outcome.model());
        span.record("outcome", outcome.kind());

        if tx.send(GatewayEvent::Finished(outcome)).await.is_err() {
            debug!("session went away before the stage finished");
        }
    }

    async fn stream_phase(
        &self,
        request: CompletionRequest,
        tx: &mpsc::Sender<GatewayEvent>,
    ) -> StreamPhase {
        let mut stream = self.provider.stream(request);
        let mut text = String::new();
        let mut model = self.requested_model.clone();

        while let Some(event) = stream.next().await {
            match event {
                Ok(StreamEvent::ModelReported { model: reported }) => model = reported,
                Ok(StreamEvent::TextDelta { text: delta }) => {
                    if delta.is_empty() {
                        continue;
                    }
                    text.push_str(&delta);
                    let chunk = GatewayEvent::Delta {
                        text: delta,
                        model: model.clone(),
                    };
                    if tx.send(chunk).await.is_err() {
                        return StreamPhase::Abandoned;
                    }
                }
                Ok(StreamEvent::Done) => break,
                Ok(_) => {}
                Err(e) => return StreamPhase::Failed(e),
            }
        }

        if text.is_empty() {
            StreamPhase::Empty
        } else {
            StreamPhase::Complete { text, model }
        }
    }

    async fn fallback_phase(&self, mut request: CompletionRequest) -> GatewayOutcome {
        request.stream = false;
        match tokio::time::timeout(self.fallback_timeout, self.provider.complete(&request)).await {
            Ok(Ok(response)) if !response.content.is_empty() => {
                let model = if response.model.is_empty() {
                    self.requested_model.clone()
                } else {
                    response.model
                };
                GatewayOutcome::FallbackUsed {
                    text: response.content,
                    model,
                }
            }
            Ok(Ok(_)) => {
                warn!(model = %self.requested_model, "fallback returned no content");
                self.failed()
            }
            Ok(Err(e)) => {
                warn!(model = %self.requested_model, error = %e, "fallback request failed");
                self.failed()
            }
            Err(_) => {
                let err = LlmError::Timeout(self.fallback_timeout.as_secs());
                warn!(model = %self.requested_model, error = %err, "fallback request failed");
                self.failed()
            }
        }
    }

    fn failed(&self) -> GatewayOutcome {
        GatewayOutcome::Failed {
            text: sentinel_text(&self.requested_model),
            model: self.placeholder_model.clone(),
        }
    }
}
