//! Output formatting utilities for the CLI.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use std::env;

use crate::domain::models::{AllocationCaps, LedgerSnapshot, TranscriptRow};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate to a maximum number of characters, appending "..." if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Ledger counts, one row per condition, with a total line.
    pub fn format_ledger(&self, snapshot: &LedgerSnapshot, caps: &AllocationCaps) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Condition").add_attribute(Attribute::Bold),
            Cell::new("Tone").add_attribute(Attribute::Bold),
            Cell::new("Mirroring").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
            Cell::new("Cap").add_attribute(Attribute::Bold),
        ]);

        for row in &snapshot.rows {
            let count = Cell::new(row.count);
            let count = if self.use_colors && row.count >= caps.per_condition {
                count.fg(Color::Red)
            } else {
                count
            };
            table.add_row(vec![
                Cell::new(row.condition.letter()),
                Cell::new(row.condition.tone.label()),
                Cell::new(row.condition.mirroring.label()),
                count,
                Cell::new(caps.per_condition),
            ]);
        }

        table.add_row(vec![
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new(""),
            Cell::new(""),
            Cell::new(snapshot.total()),
            Cell::new(caps.global),
        ]);

        table.to_string()
    }

    /// Transcript rows of one sheet.
    pub fn format_transcripts(&self, rows: &[TranscriptRow]) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("Participant").add_attribute(Attribute::Bold),
            Cell::new("Turn").add_attribute(Attribute::Bold),
            Cell::new("User").add_attribute(Attribute::Bold),
            Cell::new("Bot").add_attribute(Attribute::Bold),
            Cell::new("Logged at").add_attribute(Attribute::Bold),
        ]);

        for row in rows {
            let participant = if self.use_colors {
                Cell::new(row.participant_id.as_str()).fg(Color::Cyan)
            } else {
                Cell::new(row.participant_id.as_str())
            };
            table.add_row(vec![
                participant,
                Cell::new(row.turn),
                Cell::new(truncate(&row.user_utterance, 40)),
                Cell::new(truncate(&row.bot_reply, 60)),
                Cell::new(row.timestamp()),
            ]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Condition, Mirroring, ParticipantId, Tone};

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("짧은 답", 10), "짧은 답");
        assert_eq!(truncate("가나다라마바사", 5), "가나...");
    }

    #[test]
    fn test_ledger_table_lists_every_condition() {
        let formatter = TableFormatter::with_colors(false);
        let table = formatter.format_ledger(
            &LedgerSnapshot::from_counts([3, 1, 0, 2]),
            &AllocationCaps::default(),
        );
        for letter in ["A", "B", "C", "D", "Total"] {
            assert!(table.contains(letter), "missing {letter}");
        }
        assert!(table.contains("술어 미러링"));
        assert!(table.contains("72"));
    }

    #[test]
    fn test_transcript_table() {
        let condition = Condition::new(Tone::Formal, Mirroring::None);
        let row = TranscriptRow::new(
            ParticipantId::from_stored("CabcdEFG"),
            condition,
            2,
            "액션 영화를 더 좋아해요",
            "영화관에서 가장 선호하시는 좌석 위치는 어디인가요?",
        );
        let table = TableFormatter::with_colors(false).format_transcripts(&[row]);
        assert!(table.contains("CabcdEFG"));
        assert!(table.contains("액션 영화를 더 좋아해요"));
    }
}
