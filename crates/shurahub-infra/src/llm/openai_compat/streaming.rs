//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! Maps `async-openai`'s [`ChatCompletionResponseStream`] events to the
//! provider-agnostic [`StreamEvent`] enum defined in `shurahub-types`.
//!
//! Every chunk carries the id of the model actually serving the request;
//! a [`StreamEvent::ModelReported`] is emitted on the first chunk and again
//! whenever that id changes.

use std::pin::Pin;

use futures_util::{Stream, StreamExt};

use async_openai::types::chat::{
    ChatCompletionResponseStream, CreateChatCompletionStreamResponse, FinishReason,
};

use shurahub_types::llm::{LlmError, StopReason, StreamEvent, Usage};

/// Map an async-openai [`ChatCompletionResponseStream`] to a stream of [`StreamEvent`]s.
///
/// The returned stream emits events in this order:
/// 1. `Connected` -- immediately on entry
/// 2. `ModelReported` -- when the serving model is first seen or changes
/// 3. `TextDelta` -- for each non-empty text content chunk
/// 4. `MessageDelta` -- with the stop reason when finish_reason appears
/// 5. `Usage` -- token usage (requires `stream_options.include_usage = true` on request)
/// 6. `Done` -- at the end of the stream
pub fn map_openai_stream(
    stream: ChatCompletionResponseStream,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut current_model: Option<String> = None;
        let mut stream = stream;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;
            for event in map_chunk(&chunk, &mut current_model) {
                yield event;
            }
        }

        yield StreamEvent::Done;
    })
}

/// Translate one chunk, tracking the last reported model in `current_model`.
pub(crate) fn map_chunk(
    chunk: &CreateChatCompletionStreamResponse,
    current_model: &mut Option<String>,
) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    if !chunk.model.is_empty() && current_model.as_deref() != Some(chunk.model.as_str()) {
        *current_model = Some(chunk.model.clone());
        events.push(StreamEvent::ModelReported {
            model: chunk.model.clone(),
        });
    }

    for choice in &chunk.choices {
        if let Some(text) = choice.delta.content.as_ref().filter(|t| !t.is_empty()) {
            events.push(StreamEvent::TextDelta { text: text.clone() });
        }
        if let Some(finish_reason) = &choice.finish_reason {
            events.push(StreamEvent::MessageDelta {
                stop_reason: map_finish_reason(finish_reason),
            });
        }
    }

    // The final chunk carries usage with an empty choices array.
    if let Some(usage) = &chunk.usage {
        events.push(StreamEvent::Usage(Usage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }));
    }

    events
}

pub(crate) fn map_finish_reason(reason: &FinishReason) -> StopReason {
    match reason {
        FinishReason::Stop => StopReason::EndTurn,
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ContentFilter => StopReason::ContentFilter,
        FinishReason::ToolCalls | FinishReason::FunctionCall => StopReason::EndTurn,
    }
}
