//! Per-session short-term memory of earlier exchanges.

use std::collections::VecDeque;

use shurahub_types::config::ContextSettings;

/// One remembered exchange, already truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    question: String,
    answer: String,
}

impl ContextEntry {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// Bounded FIFO of [`ContextEntry`] owned by a single session.
///
/// Text is truncated when appended, so reads never allocate.
#[derive(Debug, Clone)]
pub struct ContextStore {
    entries: VecDeque<ContextEntry>,
    capacity: usize,
    question_chars: usize,
    answer_chars: usize,
}

impl ContextStore {
    pub fn new(settings: &ContextSettings) -> Self {
        Self {
            entries: VecDeque::with_capacity(settings.capacity),
            capacity: settings.capacity,
            question_chars: settings.question_chars,
            answer_chars: settings.answer_chars,
        }
    }

    /// Remember an exchange, evicting the oldest entry when full.
    pub fn append(&mut self, question: &str, answer: &str) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ContextEntry {
            question: truncate_chars(question, self.question_chars),
            answer: truncate_chars(answer, self.answer_chars),
        });
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn last_n(&self, n: usize) -> Vec<&ContextEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
