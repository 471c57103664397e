//! SessionLoop -- one client connection, one debate at a time.
//!
//! The loop owns the connection's identity and short-term memory. It reads
//! `{"text": ...}` frames, runs a debate per message and forwards every frame
//! the orchestrator emits. While a debate is running the inbound side is still
//! watched so a client close aborts the debate immediately; any other message
//! arriving mid-debate is dropped.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use shurahub_core::debate::context::ContextStore;
use shurahub_core::debate::orchestrator::DebateOrchestrator;
use shurahub_core::debate::sink::EventSink;
use shurahub_core::repository::debate::DebateRepository;
use shurahub_types::error::{DebateError, SinkError};
use shurahub_types::event::DebateEvent;
use shurahub_types::session::Identity;

/// Inbound client frame.
#[derive(Debug, Deserialize)]
struct ClientMessage {
    text: Option<String>,
}

/// Extract the user text from a client frame.
///
/// Invalid JSON, a missing `text` field and blank text are all malformed.
pub fn parse_client_message(raw: &str) -> Result<String, &'static str> {
    let message: ClientMessage =
        serde_json::from_str(raw).map_err(|_| "expected a JSON object with a \"text\" field")?;
    match message.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        Some(_) => Err("message text is empty"),
        None => Err("missing \"text\" field"),
    }
}

/// How a session ended.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed the connection or the transport dropped.
    Disconnected,
    /// An unexpected error; the client was notified if still reachable.
    Failed(String),
}

enum Inbound {
    Text(String),
    Closed,
    Ignored,
}

fn classify<E: std::fmt::Display>(frame: Option<Result<Message, E>>) -> Inbound {
    match frame {
        Some(Ok(Message::Text(text))) => Inbound::Text(text.as_str().to_owned()),
        Some(Ok(Message::Close(_))) | None => Inbound::Closed,
        Some(Err(err)) => {
            debug!("websocket receive error: {err}");
            Inbound::Closed
        }
        // Binary, ping and pong frames are handled by the transport.
        Some(Ok(_)) => Inbound::Ignored,
    }
}

/// Outbound half of a connection, as an [`EventSink`].
///
/// Once a send fails the sink is closed for good: every later emit returns
/// [`SinkError::Closed`] without touching the transport.
pub struct WsSink<S> {
    inner: S,
    open: bool,
}

impl<S> WsSink<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: std::fmt::Display,
{
    pub fn new(inner: S) -> Self {
        Self { inner, open: true }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    async fn send(&mut self, message: Message) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::Closed);
        }
        if let Err(err) = self.inner.send(message).await {
            debug!("websocket send failed: {err}");
            self.open = false;
            return Err(SinkError::Closed);
        }
        Ok(())
    }

    /// Best-effort close frame; marks the sink closed either way.
    pub async fn close(&mut self) {
        if self.open {
            let _ = self.inner.send(Message::Close(None)).await;
            self.open = false;
        }
    }
}

impl<S> EventSink for WsSink<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: std::fmt::Display,
{
    async fn emit(&mut self, event: DebateEvent) -> Result<(), SinkError> {
        let json = serde_json::to_string(&event).map_err(|e| SinkError::Encode(e.to_string()))?;
        self.send(Message::Text(json.into())).await
    }
}

pub struct SessionLoop<R> {
    orchestrator: Arc<DebateOrchestrator<R>>,
    identity: Identity,
    context: ContextStore,
}

impl<R: DebateRepository + 'static> SessionLoop<R> {
    pub fn new(orchestrator: Arc<DebateOrchestrator<R>>, identity: Identity) -> Self {
        let context = orchestrator.new_context();
        Self {
            orchestrator,
            identity,
            context,
        }
    }

    /// Drive the connection until the client leaves or something unexpected
    /// happens.
    pub async fn run<Tx, Rx, E>(mut self, tx: Tx, mut rx: Rx) -> SessionEnd
    where
        Tx: Sink<Message> + Unpin + Send,
        Tx::Error: std::fmt::Display,
        Rx: Stream<Item = Result<Message, E>> + Unpin + Send,
        E: std::fmt::Display,
    {
        let mut sink = WsSink::new(tx);
        info!(identity = %self.identity, "session opened");

        let end = loop {
            let raw = match classify(rx.next().await) {
                Inbound::Text(raw) => raw,
                Inbound::Closed => break SessionEnd::Disconnected,
                Inbound::Ignored => continue,
            };

            let text = match parse_client_message(&raw) {
                Ok(text) => text,
                Err(reason) => {
                    warn!(identity = %self.identity, reason, "malformed client message");
                    let frame = DebateEvent::error(self.orchestrator.system_sender(), reason);
                    match sink.emit(frame).await {
                        Ok(()) => continue,
                        Err(_) => break SessionEnd::Disconnected,
                    }
                }
            };

            match self.debate(&text, &mut sink, &mut rx).await {
                Ok(()) => {}
                Err(DebateError::Disconnected) => break SessionEnd::Disconnected,
                Err(err) => {
                    if sink.is_open() {
                        let frame = DebateEvent::error(self.orchestrator.system_sender(), &err);
                        let _ = sink.emit(frame).await;
                    }
                    sink.close().await;
                    break SessionEnd::Failed(err.to_string());
                }
            }
        };

        info!(identity = %self.identity, ?end, "session closed");
        end
    }

    async fn debate<Tx, Rx, E>(
        &mut self,
        text: &str,
        sink: &mut WsSink<Tx>,
        rx: &mut Rx,
    ) -> Result<(), DebateError>
    where
        Tx: Sink<Message> + Unpin + Send,
        Tx::Error: std::fmt::Display,
        Rx: Stream<Item = Result<Message, E>> + Unpin + Send,
        E: std::fmt::Display,
    {
        let run = self
            .orchestrator
            .run(text, &self.identity, &mut self.context, sink);
        tokio::pin!(run);

        loop {
            tokio::select! {
                biased;
                result = &mut run => return result.map(|_| ()),
                frame = rx.next() => match classify(frame) {
                    Inbound::Closed => return Err(DebateError::Disconnected),
                    Inbound::Text(_) => {
                        warn!(identity = %self.identity, "debate in progress, dropping client message");
                    }
                    Inbound::Ignored => {}
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::time::Duration;

    use shurahub_types::debate::{DebateRecord, Rater};
    use shurahub_types::error::RepositoryError;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    use crate::testing::echo_orchestrator;

    struct NullRepository;

    impl DebateRepository for NullRepository {
        async fn save_debate(&self, _: &DebateRecord) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn get_debate(&self, _: &str) -> Result<Option<DebateRecord>, RepositoryError> {
            Ok(None)
        }

        async fn list_debates(
            &self,
            _: Option<&str>,
            _: i64,
        ) -> Result<Vec<DebateRecord>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn update_rating(&self, _: &str, _: Rater, _: i64) -> Result<(), RepositoryError> {
            Err(RepositoryError::NotFound)
        }
    }

    fn orchestrator() -> Arc<DebateOrchestrator<NullRepository>> {
        Arc::new(echo_orchestrator(Arc::new(NullRepository)))
    }

    type Sent = Arc<Mutex<Vec<Message>>>;

    /// Records frames; every send after `limit` fails.
    fn recording_sink(
        limit: usize,
    ) -> (
        Sent,
        Arc<Mutex<usize>>,
        Pin<Box<dyn Sink<Message, Error = axum::Error> + Send>>,
    ) {
        let sent: Sent = Arc::new(Mutex::new(Vec::new()));
        let attempts = Arc::new(Mutex::new(0usize));
        let (sent_c, attempts_c) = (sent.clone(), attempts.clone());
        let sink = futures_util::sink::unfold((), move |(), msg: Message| {
            let sent = sent_c.clone();
            let attempts = attempts_c.clone();
            async move {
                let mut n = attempts.lock().unwrap();
                *n += 1;
                if *n > limit {
                    return Err(axum::Error::new("connection reset"));
                }
                sent.lock().unwrap().push(msg);
                Ok(())
            }
        });
        (sent, attempts, Box::pin(sink))
    }

    fn text(raw: &str) -> Result<Message, axum::Error> {
        Ok(Message::Text(raw.to_string().into()))
    }

    fn frames(sent: &Sent) -> Vec<serde_json::Value> {
        sent.lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                Message::Text(t) => serde_json::from_str(t.as_str()).ok(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_client_message() {
        assert_eq!(parse_client_message(r#"{"text":"Hi"}"#).unwrap(), "Hi");
        assert!(parse_client_message(r#"{"txt":"Hi"}"#).is_err());
        assert!(parse_client_message(r#"{"text":"   "}"#).is_err());
        assert!(parse_client_message("not json").is_err());
    }

    #[tokio::test]
    async fn test_debate_frames_forwarded_in_order() {
        let (sent, _, sink) = recording_sink(usize::MAX);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(text(r#"{"text":"Is a 4-day work week good?"}"#)).unwrap();

        let session = tokio::spawn(
            SessionLoop::new(orchestrator(), Identity::Anonymous)
                .run(sink, UnboundedReceiverStream::new(rx)),
        );

        // Ack + 3 x (typing, 2 stream, final).
        for _ in 0..200 {
            if frames(&sent).len() >= 13 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        drop(tx);
        assert_eq!(session.await.unwrap(), SessionEnd::Disconnected);

        let frames = frames(&sent);
        assert_eq!(frames.len(), 13);
        assert_eq!(frames[0]["text"], "Initiating collaborative debate...");
        assert_eq!(frames[0]["mode"], "guest");
        assert_eq!(frames[1]["type"], "typing");
        assert_eq!(frames[1]["role"], "opener");
        assert_eq!(frames[2]["type"], "stream");
        assert_eq!(frames[4]["text"], "considered answer");
        assert_eq!(frames[4]["role"], "opener");
        assert_eq!(frames[8]["role"], "critiquer");
        let verdict = frames[12]["text"].as_str().unwrap();
        assert!(verdict.starts_with("Final Verdict:"));
        assert_eq!(frames[12]["role"], "synthesizer");
    }

    #[tokio::test]
    async fn test_malformed_message_reports_and_continues() {
        let (sent, _, sink) = recording_sink(usize::MAX);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(text(r#"{"nope":1}"#)).unwrap();
        tx.send(Ok(Message::Binary(vec![1u8, 2, 3].into()))).unwrap();
        tx.send(text(r#"{"text":"still here?"}"#)).unwrap();

        let session = tokio::spawn(
            SessionLoop::new(orchestrator(), Identity::Anonymous)
                .run(sink, UnboundedReceiverStream::new(rx)),
        );
        for _ in 0..200 {
            if frames(&sent).len() >= 14 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        drop(tx);
        session.await.unwrap();

        let frames = frames(&sent);
        assert_eq!(frames[0]["sender"], "Shurahub");
        assert!(frames[0]["text"].as_str().unwrap().starts_with("Error: "));
        assert_eq!(frames[1]["text"], "Initiating collaborative debate...");
        assert_eq!(frames.len(), 14);
    }

    #[tokio::test]
    async fn test_message_during_debate_is_dropped() {
        let (sent, _, sink) = recording_sink(usize::MAX);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(text(r#"{"text":"first"}"#)).unwrap();
        tx.send(text(r#"{"text":"second"}"#)).unwrap();

        let session = tokio::spawn(
            SessionLoop::new(orchestrator(), Identity::Anonymous)
                .run(sink, UnboundedReceiverStream::new(rx)),
        );
        for _ in 0..200 {
            if frames(&sent).len() >= 13 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(tx);
        session.await.unwrap();

        let acks = frames(&sent)
            .iter()
            .filter(|f| f["text"] == "Initiating collaborative debate...")
            .count();
        assert_eq!(acks, 1);
    }

    #[tokio::test]
    async fn test_flood_during_debate_does_not_stall_it() {
        let (sent, _, sink) = recording_sink(usize::MAX);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(text(r#"{"text":"first"}"#)).unwrap();
        for i in 0..100 {
            tx.send(text(&format!(r#"{{"text":"spam {i}"}}"#))).unwrap();
        }

        let session = tokio::spawn(
            SessionLoop::new(orchestrator(), Identity::Anonymous)
                .run(sink, UnboundedReceiverStream::new(rx)),
        );
        for _ in 0..200 {
            if frames(&sent).len() >= 13 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        drop(tx);
        assert_eq!(session.await.unwrap(), SessionEnd::Disconnected);

        let frames = frames(&sent);
        assert_eq!(frames.len(), 13);
        assert!(frames[12]["text"].as_str().unwrap().starts_with("Final Verdict:"));
    }

    #[tokio::test]
    async fn test_no_send_after_transport_closed() {
        // Ack and the opener typing frame go through; the first stream frame fails.
        let (sent, attempts, sink) = recording_sink(2);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(text(r#"{"text":"hello"}"#)).unwrap();

        let end = SessionLoop::new(orchestrator(), Identity::Anonymous)
            .run(sink, UnboundedReceiverStream::new(rx))
            .await;
        drop(tx);

        assert_eq!(end, SessionEnd::Disconnected);
        assert_eq!(frames(&sent).len(), 2);
        assert_eq!(*attempts.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_close_frame_aborts_debate() {
        let (_, _, sink) = recording_sink(usize::MAX);
        let rx = futures_util::stream::iter(vec![
            text(r#"{"text":"hello"}"#),
            Ok(Message::Close(None)),
        ]);

        let end = SessionLoop::new(orchestrator(), Identity::Anonymous)
            .run(sink, rx)
            .await;
        assert_eq!(end, SessionEnd::Disconnected);
    }
}
