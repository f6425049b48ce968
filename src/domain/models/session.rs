//! Per-participant chat session state.
//!
//! A session is created once per browser session after a condition has been
//! allocated, lives only in memory, and walks through
//! `not-initialized -> active -> completed`. All transitions here are pure;
//! the dialogue service wraps them with the external calls.

use chrono::{DateTime, Utc};
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::condition::Condition;
use super::participant::ParticipantId;
use super::script;
use crate::domain::errors::{DomainError, DomainResult};

/// Lifecycle of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    /// No condition allocated yet for this browser session.
    NotInitialized,
    Active,
    /// The final turn has been taken; no further input is accepted.
    Completed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not-initialized",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Turn and input limits applied to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_turns: u32,
    pub max_input_chars: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { max_turns: 16, max_input_chars: 100 }
    }
}

/// Progress after a counted exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnProgress {
    /// Zero-based index of the turn that was just recorded.
    pub turn_index: u32,
    pub remaining: u32,
    pub last_turn_next: bool,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub participant_id: ParticipantId,
    pub condition: Condition,
    pub phase: SessionPhase,
    pub turn: u32,
    pub created_at: DateTime<Utc>,
    limits: SessionLimits,
    deck: Vec<String>,
    used: BTreeSet<usize>,
    cursor: usize,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Open an active session with a freshly shuffled deck for the condition's tone.
    pub fn start<R: Rng + ?Sized>(
        participant_id: ParticipantId,
        condition: Condition,
        limits: SessionLimits,
        rng: &mut R,
    ) -> Self {
        let mut deck = script::questions(condition.tone);
        deck.shuffle(rng);
        Self {
            id: Uuid::new_v4(),
            participant_id,
            condition,
            phase: SessionPhase::Active,
            turn: 0,
            created_at: Utc::now(),
            limits,
            deck,
            used: BTreeSet::new(),
            cursor: 0,
            messages: Vec::new(),
        }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn deck(&self) -> &[String] {
        &self.deck
    }

    pub fn used_questions(&self) -> &BTreeSet<usize> {
        &self.used
    }

    pub fn remaining_turns(&self) -> u32 {
        self.limits.max_turns.saturating_sub(self.turn)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    /// Check a participant utterance without touching any state.
    pub fn validate_input(&self, input: &str) -> DomainResult<()> {
        if self.is_completed() {
            return Err(DomainError::SessionCompleted(self.id));
        }
        if input.trim().is_empty() {
            return Err(DomainError::InputRejected(script::EMPTY_INPUT_WARNING.to_string()));
        }
        if input.chars().count() > self.limits.max_input_chars {
            return Err(DomainError::InputRejected(script::input_too_long_warning(
                self.limits.max_input_chars,
            )));
        }
        Ok(())
    }

    /// A greeting on the opening turn is answered without consuming the turn.
    pub fn is_opening_greeting(&self, input: &str) -> bool {
        self.turn == 0 && script::is_greeting(input)
    }

    pub fn record_greeting(&mut self) -> String {
        let reply = script::greeting(self.condition.tone).to_string();
        self.messages.push(ChatMessage::assistant(reply.clone()));
        reply
    }

    /// Round-robin question for the scripted condition.
    pub fn next_scripted_question(&self) -> String {
        self.deck[self.cursor % self.deck.len()].clone()
    }

    /// Random question not yet asked; starts a fresh shuffled deck once all are used.
    pub fn draw_unused_question<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        if self.used.len() >= self.deck.len() {
            let mut deck = script::questions(self.condition.tone);
            deck.shuffle(rng);
            self.deck = deck;
            self.used.clear();
        }

        let index = (0..self.deck.len())
            .filter(|i| !self.used.contains(i))
            .choose(rng)
            .unwrap_or(0);
        self.used.insert(index);
        self.deck[index].clone()
    }

    /// Append a counted exchange and advance the turn.
    pub fn record_exchange(&mut self, user_input: &str, reply: &str) -> TurnProgress {
        let turn_index = self.turn;
        self.messages.push(ChatMessage::user(user_input));
        self.messages.push(ChatMessage::assistant(reply));
        self.turn += 1;
        self.cursor += 1;

        if self.turn >= self.limits.max_turns {
            self.phase = SessionPhase::Completed;
        }

        TurnProgress {
            turn_index,
            remaining: self.remaining_turns(),
            last_turn_next: self.remaining_turns() == 1,
            completed: self.is_completed(),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            participant_id: self.participant_id.clone(),
            condition: self.condition.letter().to_string(),
            tone: self.condition.tone.label().to_string(),
            mirroring: self.condition.mirroring.label().to_string(),
            phase: self.phase,
            turn: self.turn,
            remaining_turns: self.remaining_turns(),
            messages: self.messages.clone(),
        }
    }
}

/// What the chat page needs to render a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub participant_id: ParticipantId,
    pub condition: String,
    pub tone: String,
    pub mirroring: String,
    pub phase: SessionPhase,
    pub turn: u32,
    pub remaining_turns: u32,
    pub messages: Vec<ChatMessage>,
}
