//! Participant identifiers.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::condition::Condition;

/// Condition letter followed by a random alphanumeric suffix, e.g. `B4kQz9Ta`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub const DEFAULT_SUFFIX_LEN: usize = 7;

    pub fn generate<R: Rng + ?Sized>(condition: Condition, suffix_len: usize, rng: &mut R) -> Self {
        let mut id = String::with_capacity(suffix_len + 1);
        id.push(condition.letter());
        id.extend(
            std::iter::repeat_with(|| char::from(rng.sample(Alphanumeric))).take(suffix_len),
        );
        Self(id)
    }

    /// Wrap an identifier read back from storage.
    pub fn from_stored(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The condition encoded in the prefix letter.
    pub fn condition(&self) -> Option<Condition> {
        self.0.chars().next().and_then(Condition::from_letter)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
