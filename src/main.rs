use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use std::io::{self, Read, Write};
use streamframe::client::BackendClient;
use streamframe::config::StreamConfig;
use streamframe::transport::{StreamRequest, stream_events};
use streamframe::{FramingMode, ParsedEvent, StreamingEventDecoder};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "streamframe", version, about = "Decode chunked streaming responses into JSON events")]
struct Cli {
    /// TOML configuration file (environment variables override it)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a captured stream from a file or stdin
    Decode {
        /// Input file, stdin if omitted
        file: Option<String>,

        #[command(flatten)]
        framing: FramingArgs,

        /// Feed the input in pieces of this many bytes
        #[arg(long, default_value_t = 4096)]
        chunk_size: usize,
    },
    /// POST to a backend and decode its streaming response as it arrives
    Fetch {
        /// Endpoint path, joined to the base URL
        path: String,

        #[arg(long)]
        base_url: Option<String>,

        /// JSON request body
        #[arg(long, conflicts_with = "form")]
        json: Option<String>,

        /// Form field as key=value, repeatable
        #[arg(long, value_parser = parse_field)]
        form: Vec<(String, String)>,

        #[command(flatten)]
        framing: FramingArgs,
    },
}

#[derive(Args)]
struct FramingArgs {
    /// Frame delimiting: sse or brace
    #[arg(long)]
    mode: Option<FramingMode>,

    /// Data line prefix in sse mode
    #[arg(long)]
    prefix: Option<String>,

    /// Discard buffered input beyond this many bytes without a frame
    #[arg(long)]
    max_buffer: Option<usize>,
}

impl FramingArgs {
    fn apply(self, config: &mut StreamConfig) {
        if let Some(mode) = self.mode {
            config.decoder.mode = mode;
        }
        if let Some(prefix) = self.prefix {
            config.decoder.prefix = prefix;
        }
        if self.max_buffer.is_some() {
            config.decoder.max_buffer_bytes = self.max_buffer;
        }
    }
}

fn parse_field(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StreamConfig::from_file(path)?,
        None => StreamConfig::from_env()?,
    };

    match cli.command {
        Command::Decode {
            file,
            framing,
            chunk_size,
        } => {
            framing.apply(&mut config);
            config.decoder.validate()?;
            decode(file.as_deref(), chunk_size, &config)
        }
        Command::Fetch {
            path,
            base_url,
            json,
            form,
            framing,
        } => {
            framing.apply(&mut config);
            if let Some(base_url) = base_url {
                config.backend.base_url = base_url;
            }
            config.validate()?;

            let request = if !form.is_empty() {
                StreamRequest::form(path, form)
            } else if let Some(json) = json {
                let body = serde_json::from_str(&json).context("--json is not valid JSON")?;
                StreamRequest::json(path, body)
            } else {
                StreamRequest::empty(path)
            };

            fetch(request, &config).await
        }
    }
}

fn decode(file: Option<&str>, chunk_size: usize, config: &StreamConfig) -> Result<()> {
    if chunk_size == 0 {
        bail!("--chunk-size must be greater than 0");
    }

    let input = match file {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read {}", path))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    info!(
        bytes = input.len(),
        chunk_size,
        mode = %config.decoder.mode,
        "Decoding captured stream"
    );

    let mut decoder = StreamingEventDecoder::with_config(&config.decoder);
    let mut out = io::stdout().lock();

    for chunk in input.chunks(chunk_size) {
        print_events(&mut out, &decoder.feed_bytes(chunk))?;
    }

    let (events, stats) = decoder.finish_with_stats();
    print_events(&mut out, &events)?;
    info!("{}", stats);

    Ok(())
}

async fn fetch(request: StreamRequest, config: &StreamConfig) -> Result<()> {
    let client = BackendClient::new(config.backend.clone())?;
    info!(
        "Streaming from {}/{} ({} framing)",
        client.base_url().trim_end_matches('/'),
        request.path.trim_start_matches('/'),
        config.decoder.mode
    );

    let mut stream = stream_events(&client, request, &config.decoder).await?;
    let mut out = io::stdout().lock();

    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => print_events(&mut out, std::slice::from_ref(&event))?,
            Err(e) => return Err(e).context("Stream failed"),
        }
    }

    info!("{}", stream.stats());
    Ok(())
}

fn print_events(out: &mut impl Write, events: &[ParsedEvent]) -> Result<()> {
    for event in events {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    out.flush()?;
    Ok(())
}
