use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::content::{ContentStore, GeneratedContentItem, ScoreData};

/// Ordered progress messages for the running operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressLog {
    entries: Vec<String>,
}

impl ProgressLog {
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every state transition a session goes through.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// An operation starts: busy, progress log reset
    Begin,
    Progress(String),
    /// A new primary run starts
    ClearItems,
    Append(GeneratedContentItem),
    AttachScore { id: Uuid, score: ScoreData },
    /// Tokens the operation consumed
    RecordTokens(u64),
    /// The operation settled, successfully or not
    Finish,
}

/// Session state: generated items, the progress log and the busy flag.
///
/// Only [`SessionState::apply`] mutates it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub items: ContentStore,
    pub progress: ProgressLog,
    pub busy: bool,
    pub tokens_used: u64,
}

impl SessionState {
    pub fn with_items(items: Vec<GeneratedContentItem>) -> Self {
        Self {
            items: ContentStore::from_items(items),
            ..Default::default()
        }
    }

    /// Apply one event. Returns false when the event targeted an item that
    /// does not exist.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Begin => {
                self.busy = true;
                self.progress.clear();
            }
            SessionEvent::Progress(message) => self.progress.push(message),
            SessionEvent::ClearItems => self.items.clear(),
            SessionEvent::Append(item) => self.items.push(item),
            SessionEvent::AttachScore { id, score } => return self.items.attach_score(id, score),
            SessionEvent::RecordTokens(tokens) => {
                self.tokens_used = self.tokens_used.saturating_add(tokens);
            }
            SessionEvent::Finish => self.busy = false,
        }
        true
    }
}

/// Cooperative cancellation flag.
///
/// Checked by the orchestrator between stages. A provider call already in
/// flight is not aborted; its result still lands in the store.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Shared handle to a session's state.
///
/// Two operations may hold the same handle and run interleaved. Each event
/// is applied under the lock, so appends are never lost and the last score
/// attached to an item wins.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    state: Arc<Mutex<SessionState>>,
    cancel: CancellationToken,
    active: Arc<AtomicUsize>,
}

/// Marks an operation as running on a [`SessionHandle`] until dropped.
#[derive(Debug)]
pub struct OperationGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionHandle {
    pub fn new(state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            cancel: CancellationToken::default(),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn apply(&self, event: SessionEvent) -> bool {
        self.lock().apply(event)
    }

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn items(&self) -> Vec<GeneratedContentItem> {
        self.lock().items.items().to_vec()
    }

    pub fn item(&self, id: Uuid) -> Option<GeneratedContentItem> {
        self.lock().items.get(id).cloned()
    }

    pub fn progress(&self) -> Vec<String> {
        self.lock().progress.entries().to_vec()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Register a running operation.
    ///
    /// The first operation to start on an idle handle clears a leftover
    /// cancel. Later ones keep it, so a cancel confirmed while another
    /// operation is in flight still stops everything on the handle.
    pub fn enter_operation(&self) -> OperationGuard {
        if self.active.fetch_add(1, Ordering::SeqCst) == 0 {
            self.cancel.reset();
        }
        OperationGuard {
            active: self.active.clone(),
        }
    }

    pub fn active_operations(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// User-confirmed cancel: flag the token and release the busy flag.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.apply(SessionEvent::Progress("Cancelled by user".to_string()));
        self.apply(SessionEvent::Finish);
    }
}
