pub mod notify;
pub mod runner;
pub mod state;

pub use notify::{Notifier, RecordingNotifier, TerminalNotifier, Toast, ToastLevel};
pub use runner::{HUMANIZE_PERSONA, OnDemandAction, Orchestrator};
pub use state::{CancellationToken, OperationGuard, SessionEvent, SessionHandle, SessionState};
