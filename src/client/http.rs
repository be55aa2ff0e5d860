use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use tracing::info;

use crate::config::BackendConfig;
use crate::error::{Result, StreamError};
use crate::transport::{ByteStream, RequestBody, StreamFuture, StreamRequest, Transport};

/// reqwest-backed transport for the demo backends
pub struct BackendClient {
    client: Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        // Streams run for minutes, so only connects and individual reads are bounded
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }
}

impl Transport for BackendClient {
    fn open_stream(&self, request: StreamRequest) -> StreamFuture {
        let url = self.url(&request.path);
        let client = self.client.clone();

        Box::pin(async move { Self::open_stream_impl(client, url, request.body).await })
    }

    fn name(&self) -> &str {
        "http"
    }
}

impl BackendClient {
    async fn open_stream_impl(client: Client, url: String, body: RequestBody) -> Result<ByteStream> {
        let builder = client
            .post(&url)
            .header("Accept", "text/event-stream, application/x-ndjson, application/json");

        let builder = match body {
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(&value)?;
                info!("Sending {} byte JSON request to: {}", bytes.len(), url);
                builder.header("Content-Type", "application/json").body(bytes)
            }
            RequestBody::Form(fields) => {
                info!("Sending form request with {} fields to: {}", fields.len(), url);
                builder.form(&fields)
            }
            RequestBody::Empty => {
                info!("Sending empty request to: {}", url);
                builder
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| StreamError::TransportError(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        info!("Backend responded with status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StreamError::UpstreamError {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| StreamError::TransportError(e.to_string())));

        Ok(Box::pin(stream))
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}
