use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::fallback::{extract_sources, fallback_answer};
use super::report::{format_history, ChatReport};
use super::session::{ChatTurn, Role, SessionStore};
use crate::llm::{generate_within, prompts, GenerationOptions, Generator};
use crate::workflows::grading::Level;

pub const MAX_HISTORY_TURNS: usize = 6;
const MAX_NEW_TOKENS: u32 = 450;
const TEMPERATURE: f32 = 0.35;
const MIN_ANSWER_CHARS: usize = 15;

const ROLE_PREFIXES: [&str; 4] = ["Answer:", "ANSWER:", "Assistant:", "ASSISTANT:"];
const ECHO_MARKERS: [&str; 3] = ["USER QUESTION:", "CONVERSATION HISTORY:", "REPORT TYPE:"];
const MIN_CONTENT_BEFORE_ECHO: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Session not found or expired. Please start a new chat.")]
    SessionNotFound,
    #[error("No report data provided.")]
    MissingReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub session_id: Option<String>,
    pub confidence: Option<Level>,
    pub sources: Vec<String>,
}

/// Strip a leading role prefix and any trailing echo of the prompt.
pub fn clean_answer(raw: &str) -> String {
    let mut answer = raw.trim();
    if let Some(rest) = ROLE_PREFIXES
        .iter()
        .find_map(|prefix| answer.strip_prefix(prefix))
    {
        answer = rest.trim();
    }
    for marker in ECHO_MARKERS {
        if let Some(index) = answer.find(marker) {
            if index > MIN_CONTENT_BEFORE_ECHO {
                answer = answer[..index].trim();
            }
        }
    }
    answer.to_string()
}

/// Question answering over finished reports, one-shot or inside a stored session.
#[derive(Clone)]
pub struct ReportChatService {
    generator: Arc<dyn Generator>,
    sessions: Arc<dyn SessionStore>,
    timeout: Duration,
}

impl ReportChatService {
    pub fn new(
        generator: Arc<dyn Generator>,
        sessions: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            sessions,
            timeout,
        }
    }

    pub fn open_session(&self, report: ChatReport) -> String {
        let id = self.sessions.create(report);
        info!(session = %id, "chat session opened");
        id
    }

    /// Answer without memory. `report` is `None` when the caller sent no report data.
    pub async fn ask(
        &self,
        report: Option<&ChatReport>,
        question: &str,
    ) -> Result<ChatResponse, ChatError> {
        let report = report.ok_or(ChatError::MissingReport)?;
        let answer = self.answer(report, &[], question).await;
        Ok(ChatResponse {
            sources: extract_sources(&answer),
            answer,
            session_id: None,
            confidence: Some(report.confidence()),
        })
    }

    /// Answer inside a session and record both turns.
    pub async fn ask_in_session(
        &self,
        session_id: &str,
        question: &str,
    ) -> Result<ChatResponse, ChatError> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or(ChatError::SessionNotFound)?;

        let answer = self
            .answer(&session.report, session.recent_history(MAX_HISTORY_TURNS), question)
            .await;

        let recorded = self.sessions.append_turn(session_id, Role::User, question)
            && self.sessions.append_turn(session_id, Role::Assistant, &answer);
        if !recorded {
            warn!(session = %session_id, "session expired before the turn was recorded");
        }

        Ok(ChatResponse {
            sources: extract_sources(&answer),
            answer,
            session_id: Some(session_id.to_string()),
            confidence: Some(session.report.confidence()),
        })
    }

    async fn answer(&self, report: &ChatReport, history: &[ChatTurn], question: &str) -> String {
        let prompt = prompts::report_chat(
            report.instruction(),
            &report.context_block(),
            &format_history(history),
            question,
        );
        let raw = generate_within(
            &self.generator,
            prompt,
            GenerationOptions::text(MAX_NEW_TOKENS, TEMPERATURE),
            self.timeout,
        )
        .await;

        let answer = clean_answer(&raw);
        let chars = answer.chars().count();
        if chars < MIN_ANSWER_CHARS {
            warn!(chars, "chat answer too short; using deterministic fallback");
            return fallback_answer(question, report);
        }
        debug!(chars, "chat answer generated");
        answer
    }
}
