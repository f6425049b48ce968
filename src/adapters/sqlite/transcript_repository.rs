//! SQLite implementation of the TranscriptSink.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::transcript::TIMESTAMP_FORMAT;
use crate::domain::models::{Condition, ParticipantId, TranscriptRow};
use crate::domain::ports::TranscriptSink;

#[derive(Clone)]
pub struct SqliteTranscriptRepository {
    pool: SqlitePool,
}

impl SqliteTranscriptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every row logged for one participant, in turn order.
    pub async fn list_for_participant(&self, participant_id: &str) -> DomainResult<Vec<TranscriptRow>> {
        let records: Vec<TranscriptRecord> = sqlx::query_as(
            "SELECT * FROM transcript_rows WHERE participant_id = ? ORDER BY turn, id",
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(record_to_row).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
#[allow(dead_code)]
struct TranscriptRecord {
    id: i64,
    sheet: String,
    participant_id: String,
    tone: String,
    mirroring: String,
    turn: i64,
    user_utterance: String,
    bot_reply: String,
    logged_at: String,
}

fn record_to_row(record: TranscriptRecord) -> DomainResult<TranscriptRow> {
    let condition = Condition::from_labels(&record.tone, &record.mirroring)?;
    let turn = u32::try_from(record.turn)
        .map_err(|_| DomainError::SerializationError(format!("Invalid turn {}", record.turn)))?;
    let naive = NaiveDateTime::parse_from_str(&record.logged_at, TIMESTAMP_FORMAT)
        .map_err(|e| DomainError::SerializationError(e.to_string()))?;
    let logged_at = resolve_local(naive, &Local);

    Ok(TranscriptRow {
        participant_id: ParticipantId::from_stored(record.participant_id),
        condition,
        turn,
        user_utterance: record.user_utterance,
        bot_reply: record.bot_reply,
        logged_at,
    })
}

/// Attach a zone to a stored wall-clock time.
///
/// Times repeated by a DST fall-back take the earlier instant. Times skipped
/// by a spring-forward are read with the offset in force just before the gap.
fn resolve_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t,
        LocalResult::None => tz
            .from_local_datetime(&(naive - Duration::hours(1)))
            .earliest()
            .map(|t| t + Duration::hours(1))
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

#[async_trait]
impl TranscriptSink for SqliteTranscriptRepository {
    async fn append(&self, row: &TranscriptRow) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO transcript_rows
               (sheet, participant_id, tone, mirroring, turn, user_utterance, bot_reply, logged_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(row.sheet())
        .bind(row.participant_id.as_str())
        .bind(row.condition.tone.label())
        .bind(row.condition.mirroring.label())
        .bind(i64::from(row.turn))
        .bind(&row.user_utterance)
        .bind(&row.bot_reply)
        .bind(row.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, condition: Condition, limit: usize) -> DomainResult<Vec<TranscriptRow>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let records: Vec<TranscriptRecord> = sqlx::query_as(
            r#"SELECT * FROM (
                 SELECT * FROM transcript_rows WHERE sheet = ? ORDER BY id DESC LIMIT ?
               ) ORDER BY id"#,
        )
        .bind(condition.sheet_key())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(record_to_row).collect()
    }
}
