//! `shurahub ask` -- run one debate in the terminal.
//!
//! Uses the same orchestrator as the websocket server; frames are rendered
//! to stdout as they arrive (or printed as JSON lines with `--json`).

use std::io::Write;

use anyhow::{Result, bail};
use console::style;

use shurahub_core::debate::sink::EventSink;
use shurahub_types::error::SinkError;
use shurahub_types::event::DebateEvent;
use shurahub_types::session::Identity;

use crate::state::AppState;

/// Renders debate frames to the terminal.
pub struct TerminalSink {
    json: bool,
    streamed: String,
}

impl TerminalSink {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            streamed: String::new(),
        }
    }

    fn render(&mut self, event: DebateEvent) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();

        if self.json {
            let line = serde_json::to_string(&event).map_err(|e| SinkError::Encode(e.to_string()))?;
            return writeln!(out, "{line}").map_err(|_| SinkError::Closed);
        }

        let written = match event {
            DebateEvent::Ack { text, mode, .. } => writeln!(
                out,
                "\n  {} {}",
                style(text).dim(),
                style(format!("({mode:?})").to_lowercase()).dim()
            ),
            DebateEvent::Typing { sender, role, .. } => {
                self.streamed.clear();
                writeln!(
                    out,
                    "\n  {} {}",
                    style(role.as_str()).cyan().bold(),
                    style(sender).dim()
                )
            }
            DebateEvent::Stream { text, .. } => {
                self.streamed.push_str(&text);
                write!(out, "{text}").and_then(|_| out.flush())
            }
            DebateEvent::Final { sender, text, .. } => {
                if needs_reprint(&text, &self.streamed) {
                    if !self.streamed.is_empty() {
                        let _ = writeln!(out, "\n  {}", style(format!("[{sender}]")).yellow());
                    }
                    writeln!(out, "{text}")
                } else {
                    writeln!(out)
                }
            }
            DebateEvent::Error { text, .. } => writeln!(out, "  {}", style(text).red()),
        };
        written.map_err(|_| SinkError::Closed)
    }
}

/// Whether a stage's final text differs from what was already streamed.
///
/// The synthesizer's final carries a verdict prefix in front of the streamed
/// text, so a suffix match counts as already shown.
fn needs_reprint(final_text: &str, streamed: &str) -> bool {
    streamed.is_empty() || !final_text.ends_with(streamed)
}

impl EventSink for TerminalSink {
    async fn emit(&mut self, event: DebateEvent) -> Result<(), SinkError> {
        self.render(event)
    }
}

/// Run a single debate for `question`.
pub async fn ask(state: &AppState, question: &str, visitor: Option<String>, json: bool) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        bail!("question must not be empty");
    }

    let identity = Identity::resolve(None, visitor);
    let mut context = state.orchestrator.new_context();
    let mut sink = TerminalSink::new(json);

    let debate = state
        .orchestrator
        .run(question, &identity, &mut context, &mut sink)
        .await?;
    state.orchestrator.flush_logs().await;

    if !json {
        println!();
        match debate.user_id() {
            Some(user) => println!(
                "  {} debate {} logged as {}",
                style("✓").green(),
                style(debate.id()).dim(),
                style(user).cyan()
            ),
            None => println!("  {} debate {} not logged", style("i").blue(), style(debate.id()).dim()),
        }
        println!();
    }

    Ok(())
}
