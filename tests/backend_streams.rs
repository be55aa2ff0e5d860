use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use streamframe::models::{BlogProgress, ChatTranscript, ResearchProgress, RunStatus, StepStatus};
use streamframe::streaming::decode_events;
use streamframe::{FramingMode, ParsedEvent, StreamingEventDecoder};

fn byte_chunks(
    text: &'static str,
    size: usize,
) -> impl futures::Stream<Item = Result<Bytes, Infallible>> + Unpin {
    let chunks: Vec<Result<Bytes, Infallible>> = text
        .as_bytes()
        .chunks(size)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    futures::stream::iter(chunks)
}

async fn collect_events(text: &'static str, size: usize, mode: FramingMode) -> Vec<ParsedEvent> {
    let stream = decode_events(byte_chunks(text, size), StreamingEventDecoder::new(mode));
    stream
        .map(|item| item.expect("in-memory stream cannot fail"))
        .collect()
        .await
}

/// Chat backend: bare JSON objects written back to back
const CHAT_BODY: &str = concat!(
    r#"{"event":"RunStarted","content":""}"#,
    r#"{"event":"RunResponseContent","content":"Sure! Here is a "}"#,
    r#"{"event":"ToolCallStarted","content":{"tool":"search"}}"#,
    r#"{"event":"RunResponseContent","content":"JSON example: {\"k\": \"v\"}"}"#,
    r#"{"event":"RunCompleted","content":"Sure! Here is a JSON example: {\"k\": \"v\"}"}"#,
);

/// Blog backend: SSE data lines
const BLOG_BODY: &str = concat!(
    "data: {\"step\": 1, \"status\": \"active\"}\n\n",
    "data: {\"step\": 2, \"status\": \"active\", \"data\": {\"outline\": \"1. Intro\"}}\n\n",
    "data: {\"step\": 3, \"status\": \"active\", \"data\": {\"questions\": \"Why?\"}}\n\n",
    "data: {\"complete\": true, \"blog_post\": \"# Post\", \"outline\": \"1. Intro\", \"questions\": \"Why?\", \"review\": \"ok\"}\n\n",
);

/// Research backend: SSE data lines with typed events
const RESEARCH_BODY: &str = concat!(
    "data: {\"type\": \"progress\", \"progress\": 10, \"step\": \"Analyzing uploaded document...\", \"step_index\": 0}\n\n",
    "data: {\"type\": \"agent_content\", \"content\": \"Plan: \", \"agent\": \"planner\"}\n\n",
    "data: {\"type\": \"progress\", \"progress\": 85, \"step\": \"Synthesizing comprehensive report...\", \"step_index\": 4}\n\n",
    "data: {\"type\": \"report_delta\", \"content\": \"# Findings\\n\"}\n\n",
    "data: {\"type\": \"complete\", \"progress\": 100, \"report\": \"# Findings\\nAll good.\"}\n\n",
);

#[tokio::test]
async fn test_chat_stream_into_transcript() {
    for size in [1, 5, 17, 4096] {
        let events = collect_events(CHAT_BODY, size, FramingMode::Brace).await;
        assert_eq!(events.len(), 5, "chunk size {}", size);

        let mut transcript = ChatTranscript::new();
        for event in &events {
            transcript.apply(event);
        }

        assert_eq!(transcript.text(), r#"Sure! Here is a JSON example: {"k": "v"}"#);
        assert_eq!(transcript.status(), &RunStatus::Completed);
    }
}

#[tokio::test]
async fn test_blog_stream_into_progress() {
    let events = collect_events(BLOG_BODY, 13, FramingMode::Sse).await;
    assert_eq!(events.len(), 4);

    let mut progress = BlogProgress::new();
    for event in &events[..3] {
        assert!(progress.apply(event));
    }
    assert_eq!(progress.current_step(), 2);
    assert_eq!(progress.steps()[0], StepStatus::Completed);
    assert_eq!(progress.steps()[2], StepStatus::Active);
    assert_eq!(progress.steps()[3], StepStatus::Pending);
    assert_eq!(progress.artifacts().outline.as_deref(), Some("1. Intro"));

    progress.apply(&events[3]);
    assert_eq!(progress.artifacts().blog_post.as_deref(), Some("# Post"));
    assert_eq!(progress.status(), &RunStatus::Completed);
}

#[tokio::test]
async fn test_research_stream_into_progress() {
    let events = collect_events(RESEARCH_BODY, 7, FramingMode::Sse).await;
    assert_eq!(events.len(), 5);

    let mut research = ResearchProgress::new();
    for event in &events[..4] {
        research.apply(event);
    }
    assert_eq!(research.progress(), 85);
    assert_eq!(research.step_index(), Some(4));
    assert_eq!(research.report(), "# Findings\n");
    assert_eq!(research.agent_output()[0].1, "Plan: ");

    research.apply(&events[4]);
    assert_eq!(research.report(), "# Findings\nAll good.");
    assert!(research.status().is_terminal());
}

#[tokio::test]
async fn test_backend_error_is_an_ordinary_event() {
    let body = "data: {\"type\": \"error\", \"message\": \"Index not found\"}\n\n";
    let events = collect_events(body, 4, FramingMode::Sse).await;
    assert_eq!(events.len(), 1);

    let mut research = ResearchProgress::new();
    research.apply(&events[0]);
    assert_eq!(
        research.status(),
        &RunStatus::Failed("Index not found".to_string())
    );
}

#[tokio::test]
async fn test_reducers_ignore_foreign_vocabulary() {
    let events = collect_events(RESEARCH_BODY, 64, FramingMode::Sse).await;

    let mut transcript = ChatTranscript::new();
    let mut blog = BlogProgress::new();
    for event in &events {
        assert!(!transcript.apply(event));
        blog.apply(event);
    }

    assert_eq!(transcript.status(), &RunStatus::Idle);
    assert_eq!(blog.status(), &RunStatus::Idle);
}
