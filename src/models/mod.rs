//! Typed views of the events emitted by the streaming demo backends.
//!
//! The decoder hands out untyped [`ParsedEvent`](crate::ParsedEvent)s;
//! each reducer here folds one backend's vocabulary into display state.

pub mod blog;
pub mod chat;
pub mod research;

pub use blog::{BlogArtifacts, BlogEvent, BlogProgress, StepStatus};
pub use chat::{ChatEvent, ChatTranscript};
pub use research::{ResearchEvent, ResearchProgress, ResearchStep};

/// Lifecycle of one backend run as seen from the client
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed(String),
}

impl RunStatus {
    /// Whether the run has ended, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}
