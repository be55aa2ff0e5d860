use serde::{Deserialize, Serialize};
use tracing::debug;

use super::RunStatus;
use crate::streaming::ParsedEvent;

/// One entry of the step list a progress frame may carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchStep {
    /// Icon hint: `analyze`, `plan`, `search`, `web`, `synthesize`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Event emitted by the research agent `/query-stream/` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    Progress {
        #[serde(default)]
        progress: u32,
        #[serde(default)]
        step: String,
        #[serde(default)]
        step_index: Option<usize>,
        #[serde(default)]
        steps: Option<Vec<ResearchStep>>,
    },
    AgentContent {
        content: String,
        #[serde(default)]
        agent: Option<String>,
    },
    ReportDelta {
        content: String,
    },
    Complete {
        #[serde(default)]
        report: String,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Progress of one research run, including the report as it streams in
#[derive(Debug, Clone, Default)]
pub struct ResearchProgress {
    progress: u32,
    step_text: String,
    step_index: Option<usize>,
    steps: Vec<ResearchStep>,
    agent_output: Vec<(String, String)>,
    report: String,
    status: RunStatus,
}

impl ResearchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the progress, returning whether anything changed
    pub fn apply(&mut self, event: &ParsedEvent) -> bool {
        let research: ResearchEvent = match event.to_typed() {
            Ok(research) => research,
            Err(e) => {
                debug!(error = %e, "Ignoring event without research shape");
                return false;
            }
        };

        match research {
            ResearchEvent::Progress {
                progress,
                step,
                step_index,
                steps,
            } => {
                self.progress = progress.min(100);
                self.step_text = step;
                if step_index.is_some() {
                    self.step_index = step_index;
                }
                if let Some(steps) = steps {
                    self.steps = steps;
                }
                self.status = RunStatus::Running;
            }
            ResearchEvent::AgentContent { content, agent } => {
                let agent = agent.unwrap_or_else(|| "agent".to_string());
                match self.agent_output.last_mut() {
                    Some((last, text)) if *last == agent => text.push_str(&content),
                    _ => self.agent_output.push((agent, content)),
                }
            }
            ResearchEvent::ReportDelta { content } => self.report.push_str(&content),
            ResearchEvent::Complete { report } => {
                // The final report supersedes the streamed deltas
                if !report.is_empty() {
                    self.report = report;
                }
                self.progress = 100;
                self.step_index = None;
                self.status = RunStatus::Completed;
            }
            ResearchEvent::Error { message } => {
                let message = message.unwrap_or_else(|| "Unknown error occurred".to_string());
                self.status = RunStatus::Failed(message);
            }
        }

        true
    }

    /// Percentage complete, 0 to 100
    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn step_text(&self) -> &str {
        &self.step_text
    }

    pub fn step_index(&self) -> Option<usize> {
        self.step_index
    }

    pub fn steps(&self) -> &[ResearchStep] {
        &self.steps
    }

    /// Streamed agent output grouped into runs per agent
    pub fn agent_output(&self) -> &[(String, String)] {
        &self.agent_output
    }

    pub fn report(&self) -> &str {
        &self.report
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }
}
