//! Question answering over finished audit and pre-purchase reports.

pub mod fallback;
pub mod report;
mod service;
pub mod session;

pub use report::ChatReport;
pub use service::{clean_answer, ChatError, ChatResponse, ReportChatService, MAX_HISTORY_TURNS};
pub use session::{ChatTurn, InMemorySessionStore, Role, Session, SessionStore};
