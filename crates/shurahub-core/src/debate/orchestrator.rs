//! DebateOrchestrator -- the fixed opener / critiquer / synthesizer pipeline.
//!
//! Stages run strictly in sequence: each prompt is built from the previous
//! stages' final text. Provider failures never abort a run (the gateway
//! absorbs them); only a closed client transport does.

use tracing::{debug, info, warn};

use shurahub_types::config::{ContextSettings, DebateSettings};
use shurahub_types::debate::{Debate, DebatePhase, StageResult, StageRole};
use shurahub_types::error::DebateError;
use shurahub_types::event::DebateEvent;
use shurahub_types::llm::Message;
use shurahub_types::session::Identity;

use super::context::ContextStore;
use super::persistence::PersistenceSink;
use super::prompt;
use super::selection::ModelPool;
use super::sink::EventSink;
use crate::llm::gateway::{GatewayEvent, ModelGateway};
use crate::repository::debate::DebateRepository;

pub struct DebateOrchestrator<R> {
    gateway: ModelGateway,
    pool: ModelPool,
    persistence: PersistenceSink<R>,
    settings: DebateSettings,
    context: ContextSettings,
}

impl<R: DebateRepository + 'static> DebateOrchestrator<R> {
    pub fn new(
        gateway: ModelGateway,
        pool: ModelPool,
        persistence: PersistenceSink<R>,
        settings: DebateSettings,
        context: ContextSettings,
    ) -> Self {
        Self {
            gateway,
            pool,
            persistence,
            settings,
            context,
        }
    }

    /// Fresh short-term memory for a new session.
    pub fn new_context(&self) -> ContextStore {
        ContextStore::new(&self.context)
    }

    pub fn pool(&self) -> &ModelPool {
        &self.pool
    }

    /// Wait for pending debate-log writes.
    pub async fn flush_logs(&self) {
        debug!(pending = self.persistence.pending(), "waiting for debate logs");
        self.persistence.flush().await;
    }

    /// Name used as `sender` on acknowledgement and error frames.
    pub fn system_sender(&self) -> &str {
        &self.settings.system_sender
    }

    /// Run one debate for `user_text`, emitting frames into `sink` as it goes.
    ///
    /// On success the debate has been appended to `context` and handed to
    /// persistence. The only error is the client going away mid-run.
    pub async fn run<S: EventSink>(
        &self,
        user_text: &str,
        identity: &Identity,
        context: &mut ContextStore,
        sink: &mut S,
    ) -> Result<Debate, DebateError> {
        let mut phase = DebatePhase::Init;
        let result = self
            .run_pipeline(user_text, identity, context, sink, &mut phase)
            .await;
        if let Err(e) = &result {
            warn!(%identity, at = %phase, error = %e, "debate aborted");
            transition(&mut phase, DebatePhase::Aborted);
        }
        result
    }

    async fn run_pipeline<S: EventSink>(
        &self,
        user_text: &str,
        identity: &Identity,
        context: &mut ContextStore,
        sink: &mut S,
        phase: &mut DebatePhase,
    ) -> Result<Debate, DebateError> {
        let [opener_model, critiquer_model, synthesizer_model] = self.pool.select(&mut rand::rng());
        info!(
            %identity,
            opener = %opener_model,
            critiquer = %critiquer_model,
            synthesizer = %synthesizer_model,
            "starting debate"
        );

        sink.emit(DebateEvent::ack(&self.settings.system_sender, identity.mode()))
            .await?;

        let opener_prompt = prompt::opener(user_text, &context.last_n(context.capacity()));
        let opener = self
            .run_stage(StageRole::Opener, &opener_model, opener_prompt, sink, phase)
            .await?;

        let critique_prompt =
            prompt::critique(user_text, &opener.actual_model, &opener.response_text);
        let critiquer = self
            .run_stage(StageRole::Critiquer, &critiquer_model, critique_prompt, sink, phase)
            .await?;

        let synthesis_prompt = prompt::synthesis(
            user_text,
            &opener.actual_model,
            &opener.response_text,
            &critiquer.actual_model,
            &critiquer.response_text,
        );
        let synthesizer = self
            .run_stage(StageRole::Synthesizer, &synthesizer_model, synthesis_prompt, sink, phase)
            .await?;

        transition(phase, DebatePhase::RecordReady);
        context.append(user_text, &synthesizer.response_text);
        let debate = Debate::assemble(
            identity.user_id().map(str::to_string),
            user_text.to_string(),
            opener,
            critiquer,
            synthesizer,
        );

        transition(phase, DebatePhase::Logging);
        self.persistence.store(&debate);

        transition(phase, DebatePhase::Done);
        info!(debate_id = %debate.id(), %identity, "debate complete");
        Ok(debate)
    }

    async fn run_stage<S: EventSink>(
        &self,
        role: StageRole,
        requested_model: &str,
        prompt: String,
        sink: &mut S,
        phase: &mut DebatePhase,
    ) -> Result<StageResult, DebateError> {
        transition(phase, DebatePhase::for_stage(role));
        sink.emit(DebateEvent::typing(requested_model, role)).await?;

        let mut call = self.gateway.call(requested_model, vec![Message::user(prompt)]);
        let outcome = loop {
            match call.next_event().await {
                Some(GatewayEvent::Delta { text, model }) => {
                    sink.emit(DebateEvent::stream(model, text, role)).await?;
                }
                Some(GatewayEvent::Finished(outcome)) => break outcome,
                None => break call.failure(),
            }
        };

        debug!(%role, requested = requested_model, actual = outcome.model(), kind = outcome.kind(), "stage finished");
        let (text, actual_model) = outcome.into_parts();

        let shown = match role {
            StageRole::Synthesizer => format!("{}{}", self.settings.verdict_prefix, text),
            _ => text.clone(),
        };
        sink.emit(DebateEvent::stage_final(&actual_model, shown, role))
            .await?;

        Ok(StageResult {
            role,
            requested_model: requested_model.to_string(),
            actual_model,
            response_text: text,
        })
    }
}

fn transition(phase: &mut DebatePhase, next: DebatePhase) {
    debug!(from = %phase, to = %next, "debate phase");
    *phase = next;
}
