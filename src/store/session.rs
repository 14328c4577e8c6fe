use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{json_files, read_json, write_json};
use crate::content::GeneratedContentItem;
use crate::errors::StoreError;
use crate::orchestrator::SessionState;
use crate::request::GenerationRequest;

/// A saved session: the request that produced it and every item generated
/// since.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request: GenerationRequest,
    pub items: Vec<GeneratedContentItem>,
    #[serde(default)]
    pub tokens_used: u64,
}

impl SessionRecord {
    pub fn new(request: GenerationRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            request,
            items: Vec::new(),
            tokens_used: 0,
        }
    }

    /// Session state to resume on-demand work from.
    pub fn to_state(&self) -> SessionState {
        let mut state = SessionState::with_items(self.items.clone());
        state.tokens_used = self.tokens_used;
        state
    }

    /// Take items and token count from a finished operation.
    pub fn update_from(&mut self, state: &SessionState) {
        self.items = state.items.items().to_vec();
        self.tokens_used = state.tokens_used;
    }

    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Write the record, stamping `updated_at`.
    pub fn save(&self, record: &mut SessionRecord) -> Result<PathBuf, StoreError> {
        record.updated_at = Utc::now();
        let path = self.path_for(record.id);
        write_json(&path, record)?;
        tracing::debug!(session = %record.id, items = record.items.len(), "saved session");
        Ok(path)
    }

    /// Load by full id or unique id prefix.
    pub fn load(&self, id: &str) -> Result<SessionRecord, StoreError> {
        let needle = id.trim().to_lowercase();
        let not_found = || StoreError::SessionNotFound { id: id.to_string() };
        if needle.is_empty() {
            return Err(not_found());
        }

        let matches: Vec<PathBuf> = json_files(&self.dir)?
            .into_iter()
            .filter(|p| {
                p.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with(&needle))
            })
            .collect();

        match matches.as_slice() {
            [path] => read_json(path),
            _ => Err(not_found()),
        }
    }

    /// All sessions, newest first. Unreadable files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let mut records = Vec::new();
        for path in json_files(&self.dir)? {
            match read_json::<SessionRecord>(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable session"),
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub fn latest(&self) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.list()?.into_iter().next())
    }
}
