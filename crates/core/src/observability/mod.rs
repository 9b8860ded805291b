//! Interaction recording and reporting.
//!
//! `InteractionObserver` is the run-scoped context object: it owns the current
//! [`Session`] and the durable [`InteractionLog`], and is handed by reference
//! to the orchestrator and to every report.

pub mod export;
pub mod log;
pub mod metrics;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::interaction::{InteractionDraft, InteractionRecord};
use crate::domain::session::{Session, SessionId};

pub use export::ExportError;
pub use log::{InteractionLog, LogError};
pub use metrics::{
    ConfusionMatrix, HistoricalSummary, InteractionSummary, QuestionFrequency, ResponseTimeStats,
    SessionSummary, ToolAccuracy,
};

#[derive(Debug)]
pub struct InteractionObserver {
    session: Mutex<Session>,
    log: InteractionLog,
}

impl InteractionObserver {
    pub fn new(log: InteractionLog) -> Self {
        Self::with_session(Session::start(), log)
    }

    pub fn with_session(session: Session, log: InteractionLog) -> Self {
        Self { session: Mutex::new(session), log }
    }

    pub fn session_id(&self) -> SessionId {
        self.session().id().clone()
    }

    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    /// Builds the record and appends it to the durable log and then to the
    /// session, both under the session lock. A log failure leaves the session
    /// untouched.
    pub fn record(&self, draft: InteractionDraft) -> Result<InteractionRecord, LogError> {
        let mut session = self.session();
        let timestamp = session.next_timestamp(Utc::now());
        let record = InteractionRecord::from_draft(draft, session.id().clone(), timestamp)?;

        self.log.append(&record)?;
        session.push(record.clone());

        tracing::debug!(
            event_name = "observability.record.appended",
            session_id = %record.session_id,
            tool = record.actual_tool(),
            success = record.success,
            "interaction recorded"
        );
        Ok(record)
    }

    pub fn records(&self) -> Vec<InteractionRecord> {
        self.session().records().to_vec()
    }

    pub fn session_summary(&self) -> SessionSummary {
        let session = self.session();
        metrics::session_summary(session.id(), session.records())
    }

    pub fn tool_accuracy_report(&self) -> Vec<ToolAccuracy> {
        metrics::tool_accuracy_report(self.session().records())
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        metrics::confusion_matrix(self.session().records())
    }

    pub fn failed_interactions(&self) -> Vec<InteractionRecord> {
        metrics::failed_interactions(self.session().records()).into_iter().cloned().collect()
    }

    /// Summary across every record in the durable log, all sessions included.
    pub fn historical_summary(&self, top_n: usize) -> Result<HistoricalSummary, LogError> {
        let records = self.log.load_all()?;
        Ok(metrics::historical_summary(&records, top_n))
    }

    pub fn export_csv(&self, path: &Path) -> Result<usize, ExportError> {
        let rows = export::write_csv(self.session().records(), path)?;
        tracing::info!(
            event_name = "observability.export.completed",
            path = %path.display(),
            rows,
            "session interactions exported"
        );
        Ok(rows)
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        match self.session.lock() {
            Ok(session) => session,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
