use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::interaction::InteractionRecord;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Time-derived id, e.g. `20260214_093012_4f1a`. The suffix keeps two
    /// processes started in the same second apart.
    pub fn generate(started_at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", started_at.format("%Y%m%d_%H%M%S"), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run-scoped, append-only container of interaction records.
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    started_at: DateTime<Utc>,
    records: Vec<InteractionRecord>,
}

impl Session {
    pub fn start() -> Self {
        let started_at = Utc::now();
        Self::with_id(SessionId::generate(started_at), started_at)
    }

    pub fn with_id(id: SessionId, started_at: DateTime<Utc>) -> Self {
        Self { id, started_at, records: Vec::new() }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    /// Earliest instant the next record may carry.
    pub fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.records.last().map(|last| last.timestamp.max(now)).unwrap_or(now)
    }

    pub(crate) fn push(&mut self, record: InteractionRecord) {
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Session, SessionId};

    #[test]
    fn generated_id_starts_with_start_instant() {
        let started_at = Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 12).single().expect("valid");
        let id = SessionId::generate(started_at);
        assert!(id.as_str().starts_with("20260214_093012_"));
        assert_eq!(id.as_str().len(), "20260214_093012_".len() + 8);
    }

    #[test]
    fn empty_session_uses_current_instant_for_next_record() {
        let now = Utc::now();
        let session = Session::with_id(SessionId("s-1".to_string()), now);
        assert_eq!(session.next_timestamp(now), now);
        assert!(session.records().is_empty());
    }
}
