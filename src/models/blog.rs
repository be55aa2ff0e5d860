use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RunStatus;
use crate::streaming::ParsedEvent;

/// Stages reported by the blog generator, in order
pub const BLOG_STEPS: [&str; 7] = [
    "Analyzing document context...",
    "Generating blog outline...",
    "Creating relevant questions...",
    "Retrieving context from document...",
    "Writing blog content...",
    "Reviewing and refining...",
    "Finalizing blog post...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

impl StepStatus {
    fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("completed") => Self::Completed,
            Some("pending") => Self::Pending,
            _ => Self::Active,
        }
    }
}

/// Intermediate and final outputs of a blog run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogArtifacts {
    pub outline: Option<String>,
    pub questions: Option<String>,
    pub blog_post: Option<String>,
    pub review: Option<String>,
}

impl BlogArtifacts {
    /// Overwrite fields that are present and non-empty in `other`
    fn merge(&mut self, other: BlogArtifacts) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if let Some(value) = value
                && !value.is_empty()
            {
                *slot = Some(value);
            }
        }

        take(&mut self.outline, other.outline);
        take(&mut self.questions, other.questions);
        take(&mut self.blog_post, other.blog_post);
        take(&mut self.review, other.review);
    }
}

/// Event emitted by the `/generate-blog` endpoint.
///
/// The backend uses loose shapes: progress frames carry `step`, the final
/// frame carries `complete` with the artifacts at top level, and failures
/// carry `error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogEvent {
    /// 1-based step number
    pub step: Option<usize>,
    pub status: Option<String>,
    pub data: Option<BlogArtifacts>,
    pub complete: Option<bool>,
    pub error: Option<String>,
    #[serde(flatten)]
    pub result: BlogArtifacts,
}

/// Step-by-step progress of one blog generation run
#[derive(Debug, Clone)]
pub struct BlogProgress {
    steps: Vec<StepStatus>,
    current_step: usize,
    artifacts: BlogArtifacts,
    status: RunStatus,
}

impl BlogProgress {
    pub fn new() -> Self {
        Self {
            steps: vec![StepStatus::Pending; BLOG_STEPS.len()],
            current_step: 0,
            artifacts: BlogArtifacts::default(),
            status: RunStatus::Idle,
        }
    }

    /// Fold one event into the progress, returning whether anything changed
    pub fn apply(&mut self, event: &ParsedEvent) -> bool {
        let blog: BlogEvent = match event.to_typed() {
            Ok(blog) => blog,
            Err(e) => {
                debug!(error = %e, "Ignoring event without blog shape");
                return false;
            }
        };

        if let Some(error) = blog.error.filter(|e| !e.is_empty()) {
            self.status = RunStatus::Failed(error);
            return true;
        }

        if blog.complete == Some(true) {
            self.artifacts.merge(blog.result);
            self.status = RunStatus::Completed;
            return true;
        }

        match blog.step {
            Some(step) if step > 0 => {
                let index = step - 1;
                let active = StepStatus::from_label(blog.status.as_deref());
                for (i, slot) in self.steps.iter_mut().enumerate() {
                    *slot = match i.cmp(&index) {
                        std::cmp::Ordering::Less => StepStatus::Completed,
                        std::cmp::Ordering::Equal => active,
                        std::cmp::Ordering::Greater => StepStatus::Pending,
                    };
                }
                self.current_step = index;
                self.status = RunStatus::Running;

                if let Some(data) = blog.data {
                    self.artifacts.merge(data);
                }
                true
            }
            _ => false,
        }
    }

    pub fn steps(&self) -> &[StepStatus] {
        &self.steps
    }

    /// Zero-based index of the most recently reported step
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn artifacts(&self) -> &BlogArtifacts {
        &self.artifacts
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }
}

impl Default for BlogProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_progression() {
        let mut progress = BlogProgress::new();
        assert!(progress.apply(&ParsedEvent::from(json!({"step": 3}))));

        assert_eq!(progress.current_step(), 2);
        assert_eq!(
            &progress.steps()[..4],
            &[
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Active,
                StepStatus::Pending
            ]
        );
        assert_eq!(progress.status(), &RunStatus::Running);
    }

    #[test]
    fn test_intermediate_data_kept() {
        let mut progress = BlogProgress::new();
        progress.apply(&ParsedEvent::from(json!({
            "step": 2,
            "status": "completed",
            "data": {"outline": "1. Intro\n2. Body"}
        })));

        assert_eq!(progress.steps()[1], StepStatus::Completed);
        assert_eq!(
            progress.artifacts().outline.as_deref(),
            Some("1. Intro\n2. Body")
        );
    }

    #[test]
    fn test_complete_event() {
        let mut progress = BlogProgress::new();
        progress.apply(&ParsedEvent::from(json!({"step": 1, "data": {"outline": "draft"}})));
        progress.apply(&ParsedEvent::from(json!({
            "complete": true,
            "blog_post": "# Title",
            "outline": "final outline",
            "questions": "",
            "review": "Looks good"
        })));

        let artifacts = progress.artifacts();
        assert_eq!(artifacts.blog_post.as_deref(), Some("# Title"));
        assert_eq!(artifacts.outline.as_deref(), Some("final outline"));
        assert_eq!(artifacts.questions, None);
        assert_eq!(artifacts.review.as_deref(), Some("Looks good"));
        assert_eq!(progress.status(), &RunStatus::Completed);
    }

    #[test]
    fn test_error_event() {
        let mut progress = BlogProgress::new();
        progress.apply(&ParsedEvent::from(json!({"error": "namespace not found"})));
        assert_eq!(
            progress.status(),
            &RunStatus::Failed("namespace not found".to_string())
        );
    }

    #[test]
    fn test_unrelated_event_ignored() {
        let mut progress = BlogProgress::new();
        assert!(!progress.apply(&ParsedEvent::from(json!({"step": 0}))));
        assert!(!progress.apply(&ParsedEvent::from(json!({"type": "progress"}))));
        assert_eq!(progress.status(), &RunStatus::Idle);
    }
}
