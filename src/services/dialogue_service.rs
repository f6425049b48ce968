//! Dialogue driver: session lifecycle and turn handling.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::script;
use crate::domain::models::{
    AllocationOutcome, ChatSession, ParticipantId, SessionLimits, SessionPhase, SessionView,
    StudyConfig, TranscriptRow,
};
use crate::domain::ports::TranscriptSink;

use super::allocation_service::AllocationService;
use super::mirroring_service::MirroringService;

/// Result of one submitted utterance.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    /// False for the opening greeting, which does not consume a turn.
    pub counted: bool,
    /// Non-fatal notices for the participant (last turn, logging failure).
    pub warnings: Vec<String>,
    /// Set once the session completes.
    pub notice: Option<String>,
    pub session: SessionView,
}

type SessionHandle = Arc<Mutex<ChatSession>>;

pub struct DialogueService {
    allocation: AllocationService,
    mirroring: MirroringService,
    transcripts: Arc<dyn TranscriptSink>,
    limits: SessionLimits,
    suffix_len: usize,
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl DialogueService {
    pub fn new(
        allocation: AllocationService,
        mirroring: MirroringService,
        transcripts: Arc<dyn TranscriptSink>,
        study: &StudyConfig,
    ) -> Self {
        Self {
            allocation,
            mirroring,
            transcripts,
            limits: study.session_limits(),
            suffix_len: study.participant_suffix_len,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn allocation(&self) -> &AllocationService {
        &self.allocation
    }

    /// Allocate a condition and open a session for a new participant.
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> DomainResult<SessionView> {
        let condition = match self.allocation.allocate().await? {
            AllocationOutcome::Assigned(condition) => condition,
            AllocationOutcome::Exhausted => return Err(DomainError::StudyFull),
        };

        let session = {
            let mut rng = rand::thread_rng();
            let participant_id = ParticipantId::generate(condition, self.suffix_len, &mut rng);
            ChatSession::start(participant_id, condition, self.limits, &mut rng)
        };
        let view = session.view();

        self.sessions
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session)));

        info!(
            session_id = %view.session_id,
            participant_id = %view.participant_id,
            condition = %view.condition,
            "Session started"
        );
        Ok(view)
    }

    /// Handle one participant utterance.
    #[instrument(skip(self, input), fields(chars = input.chars().count()))]
    pub async fn submit_turn(&self, session_id: Uuid, input: &str) -> DomainResult<TurnOutcome> {
        let handle = self.handle(session_id).await?;
        let mut session = handle.lock().await;

        if let Err(e) = session.validate_input(input) {
            debug!(error = %e, "Input rejected");
            return Err(e);
        }

        if session.is_opening_greeting(input) {
            let reply = session.record_greeting();
            return Ok(TurnOutcome {
                reply,
                counted: false,
                warnings: Vec::new(),
                notice: None,
                session: session.view(),
            });
        }

        let tone = session.condition.tone;
        let reply = if session.condition.is_mirroring() {
            let keywords = self.mirroring.extract_keywords(input).await;
            let question = {
                let mut rng = rand::thread_rng();
                session.draw_unused_question(&mut rng)
            };
            self.mirroring.mirror(input, tone, &keywords, &question).await
        } else {
            session.next_scripted_question()
        };

        let progress = session.record_exchange(input, &reply);
        let mut warnings = Vec::new();

        let row = TranscriptRow::new(
            session.participant_id.clone(),
            session.condition,
            progress.turn_index,
            input,
            reply.clone(),
        );
        if let Err(e) = self.transcripts.append(&row).await {
            error!(
                error = %e,
                participant_id = %row.participant_id,
                turn = row.turn,
                "Failed to log transcript row"
            );
            warnings.push(script::LOGGING_FAILED_WARNING.to_string());
        }

        if progress.last_turn_next {
            warnings.push(script::LAST_TURN_WARNING.to_string());
        }

        let notice = if progress.completed {
            info!(participant_id = %session.participant_id, turns = session.turn, "Session completed");
            Some(script::COMPLETED_NOTICE.to_string())
        } else {
            None
        };

        Ok(TurnOutcome {
            reply,
            counted: true,
            warnings,
            notice,
            session: session.view(),
        })
    }

    pub async fn view(&self, session_id: Uuid) -> DomainResult<SessionView> {
        let handle = self.handle(session_id).await?;
        let session = handle.lock().await;
        Ok(session.view())
    }

    /// Phase of a session; ids never issued (or already ended) are not initialized.
    pub async fn phase(&self, session_id: Uuid) -> SessionPhase {
        match self.handle(session_id).await {
            Ok(handle) => handle.lock().await.phase,
            Err(_) => SessionPhase::NotInitialized,
        }
    }

    /// Drop the in-memory session. The ledger slot stays taken.
    #[instrument(skip(self))]
    pub async fn end_session(&self, session_id: Uuid) -> DomainResult<()> {
        self.sessions
            .write()
            .await
            .remove(&session_id)
            .map(|_| info!("Session ended"))
            .ok_or(DomainError::SessionNotFound(session_id))
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn handle(&self, session_id: Uuid) -> DomainResult<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(DomainError::SessionNotFound(session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::MockTextGenerator;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteLedgerRepository, SqliteTranscriptRepository};
    use crate::services::mirroring_service::MirroringParams;

    async fn setup() -> DialogueService {
        let pool = create_migrated_test_pool().await.unwrap();
        let study = StudyConfig::default();
        let allocation = AllocationService::new(Arc::new(SqliteLedgerRepository::new(pool.clone())), &study);
        let mirroring = MirroringService::new(Arc::new(MockTextGenerator::new()), MirroringParams::default());
        DialogueService::new(allocation, mirroring, Arc::new(SqliteTranscriptRepository::new(pool)), &study)
    }

    #[tokio::test]
    async fn test_start_session_assigns_participant() {
        let service = setup().await;
        let view = service.start_session().await.unwrap();

        assert_eq!(view.phase, SessionPhase::Active);
        assert_eq!(view.turn, 0);
        assert_eq!(view.remaining_turns, 16);
        assert_eq!(view.participant_id.as_str().len(), 8);
        assert!(view.participant_id.as_str().starts_with(&view.condition));
        assert_eq!(service.phase(view.session_id).await, SessionPhase::Active);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let service = setup().await;
        let id = Uuid::new_v4();
        assert_eq!(service.phase(id).await, SessionPhase::NotInitialized);
        assert!(matches!(
            service.submit_turn(id, "hi").await,
            Err(DomainError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_end_session_forgets_state() {
        let service = setup().await;
        let view = service.start_session().await.unwrap();
        service.end_session(view.session_id).await.unwrap();

        assert_eq!(service.phase(view.session_id).await, SessionPhase::NotInitialized);
        assert_eq!(service.active_sessions().await, 0);
        assert!(service.end_session(view.session_id).await.is_err());
        assert_eq!(service.allocation().snapshot().await.unwrap().total(), 1);
    }
}
