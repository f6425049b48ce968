//! Transcript rows appended once per counted turn.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::participant::ParticipantId;

/// Timestamp layout used in the transcript sheets.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRow {
    pub participant_id: ParticipantId,
    pub condition: Condition,
    pub turn: u32,
    pub user_utterance: String,
    pub bot_reply: String,
    pub logged_at: DateTime<Local>,
}

impl TranscriptRow {
    pub fn new(
        participant_id: ParticipantId,
        condition: Condition,
        turn: u32,
        user_utterance: impl Into<String>,
        bot_reply: impl Into<String>,
    ) -> Self {
        Self {
            participant_id,
            condition,
            turn,
            user_utterance: user_utterance.into(),
            bot_reply: bot_reply.into(),
            logged_at: Local::now(),
        }
    }

    /// Sheet this row belongs to.
    pub fn sheet(&self) -> &'static str {
        self.condition.sheet_key()
    }

    pub fn timestamp(&self) -> String {
        self.logged_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
