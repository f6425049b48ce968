//! Experimental conditions: tone x mirroring.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

/// Speech level the assistant uses for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// 반말
    Informal,
    /// 존댓말
    Formal,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informal => "informal",
            Self::Formal => "formal",
        }
    }

    /// Label stored in the ledger and transcript sheets.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Informal => "반말",
            Self::Formal => "존댓말",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "반말" | "informal" => Some(Self::Informal),
            "존댓말" | "formal" => Some(Self::Formal),
            _ => None,
        }
    }

    pub fn is_formal(&self) -> bool {
        matches!(self, Self::Formal)
    }
}

/// Reply mode for the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mirroring {
    /// 없음: scripted questions only.
    None,
    /// 술어 미러링: paraphrase the participant before asking.
    Predicate,
}

impl Mirroring {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Predicate => "predicate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "없음",
            Self::Predicate => "술어 미러링",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "없음" | "none" => Some(Self::None),
            "술어 미러링" | "predicate" => Some(Self::Predicate),
            _ => None,
        }
    }
}

/// One of the four experimental cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub tone: Tone,
    pub mirroring: Mirroring,
}

impl Condition {
    /// All cells, in letter order.
    pub const ALL: [Condition; 4] = [
        Condition::new(Tone::Informal, Mirroring::None),
        Condition::new(Tone::Informal, Mirroring::Predicate),
        Condition::new(Tone::Formal, Mirroring::None),
        Condition::new(Tone::Formal, Mirroring::Predicate),
    ];

    pub const fn new(tone: Tone, mirroring: Mirroring) -> Self {
        Self { tone, mirroring }
    }

    /// Participant-ID prefix.
    pub fn letter(&self) -> char {
        match (self.tone, self.mirroring) {
            (Tone::Informal, Mirroring::None) => 'A',
            (Tone::Informal, Mirroring::Predicate) => 'B',
            (Tone::Formal, Mirroring::None) => 'C',
            (Tone::Formal, Mirroring::Predicate) => 'D',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.letter() == letter.to_ascii_uppercase())
    }

    /// Fixed identifier of the transcript sheet for this cell.
    pub fn sheet_key(&self) -> &'static str {
        match (self.tone, self.mirroring) {
            (Tone::Informal, Mirroring::None) => "informal-none",
            (Tone::Informal, Mirroring::Predicate) => "informal-predicate",
            (Tone::Formal, Mirroring::None) => "formal-none",
            (Tone::Formal, Mirroring::Predicate) => "formal-predicate",
        }
    }

    pub fn from_labels(tone: &str, mirroring: &str) -> DomainResult<Self> {
        let t = Tone::from_label(tone)
            .ok_or_else(|| DomainError::UnknownCondition(format!("tone '{}'", tone)))?;
        let m = Mirroring::from_label(mirroring)
            .ok_or_else(|| DomainError::UnknownCondition(format!("mirroring '{}'", mirroring)))?;
        Ok(Self::new(t, m))
    }

    pub fn is_mirroring(&self) -> bool {
        matches!(self.mirroring, Mirroring::Predicate)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.letter(), self.tone.as_str(), self.mirroring.as_str())
    }
}

impl std::str::FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter)
                .ok_or_else(|| DomainError::UnknownCondition(s.to_string())),
            _ => Self::ALL
                .into_iter()
                .find(|c| c.sheet_key() == s.trim())
                .ok_or_else(|| DomainError::UnknownCondition(s.to_string())),
        }
    }
}
