//! Bounded conversational memory.
//!
//! A [`MemoryWindow`] keeps the last `max_turns` turns of a conversation and
//! renders them into the `{history}` slot of a persona template. The window is
//! always a suffix of the session history: recording past the bound evicts the
//! oldest turn, and [`MemoryWindow::from_history`] rebuilds the same suffix
//! from scratch.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::message::Turn;

/// Smallest accepted window size.
pub const MIN_MEMORY_TURNS: usize = 1;
/// Largest accepted window size.
pub const MAX_MEMORY_TURNS: usize = 10;

const HUMAN_PREFIX: &str = "Human: ";
const AI_PREFIX: &str = "AI: ";

/// Check a window size without building a window.
pub fn validate_memory_turns(max_turns: usize) -> Result<()> {
    if (MIN_MEMORY_TURNS..=MAX_MEMORY_TURNS).contains(&max_turns) {
        Ok(())
    } else {
        Err(Error::config(format!(
            "memory_turns must be between {MIN_MEMORY_TURNS} and {MAX_MEMORY_TURNS}, got {max_turns}"
        )))
    }
}

/// The most recent turns replayed to the model as context.
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    max_turns: usize,
    turns: VecDeque<Turn>,
}

impl MemoryWindow {
    /// Create an empty window. Fails for sizes outside `1..=10`.
    pub fn new(max_turns: usize) -> Result<Self> {
        validate_memory_turns(max_turns)?;
        Ok(Self {
            max_turns,
            turns: VecDeque::with_capacity(max_turns + 1),
        })
    }

    /// Rebuild a window from a history slice, keeping its last `max_turns` turns.
    pub fn from_history(history: &[Turn], max_turns: usize) -> Result<Self> {
        let mut window = Self::new(max_turns)?;
        let start = history.len().saturating_sub(max_turns);
        window.turns.extend(history[start..].iter().cloned());
        Ok(window)
    }

    /// Append a turn, evicting the oldest one once the bound is exceeded.
    pub fn record(&mut self, human: impl Into<String>, ai: impl Into<String>) {
        self.push(Turn::new(human, ai));
    }

    /// Append an existing turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    /// Empty the window. History owned elsewhere is unaffected.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Serialize the retained turns for the `{history}` placeholder.
    ///
    /// Each turn is framed as `Human: …\nAI: …`, oldest first, joined by
    /// newlines. An empty window renders as the empty string.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{HUMAN_PREFIX}{}\n{AI_PREFIX}{}", t.human(), t.ai()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}

/// Parse text produced by [`MemoryWindow::render`] back into `(human, ai)` pairs.
///
/// Lines that start neither a human nor an AI part are treated as
/// continuation lines of the current message. A message whose own text
/// contains a line beginning with `Human: ` or `AI: ` cannot be told apart
/// from a new part and is split there.
pub fn parse_rendered(rendered: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut human: Option<String> = None;
    let mut ai: Option<String> = None;

    for line in rendered.split('\n') {
        if let Some(text) = line.strip_prefix(HUMAN_PREFIX) {
            if let Some(h) = human.take() {
                pairs.push((h, ai.take().unwrap_or_default()));
            }
            human = Some(text.to_string());
        } else if let (Some(text), true, None) =
            (line.strip_prefix(AI_PREFIX), human.is_some(), ai.as_ref())
        {
            ai = Some(text.to_string());
        } else if let Some(a) = ai.as_mut() {
            a.push('\n');
            a.push_str(line);
        } else if let Some(h) = human.as_mut() {
            h.push('\n');
            h.push_str(line);
        }
    }

    if let Some(h) = human {
        pairs.push((h, ai.unwrap_or_default()));
    }
    pairs
}
