//! lectern CLI: terminal client for a retrieval-augmented research assistant.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use lectern::api::ApiClient;
use lectern::config::ClientConfig;
use lectern::message::ChatMessage;

#[derive(Parser)]
#[command(
    name = "lectern",
    version,
    about = "Terminal client for a retrieval-augmented research assistant"
)]
struct Cli {
    /// Research server origin, e.g. http://127.0.0.1:8000 (or LECTERN_SERVER).
    #[arg(long, global = true)]
    server: Option<String>,

    /// API key forwarded on research requests (or LECTERN_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session (the default).
    Chat,

    /// Add a source to the knowledge base.
    Ingest {
        /// URL to fetch and index.
        source: Option<String>,

        /// Raw text to index instead of a URL.
        #[arg(long, conflicts_with = "source")]
        text: Option<String>,

        /// PDF file to upload instead of a URL.
        #[arg(long, conflicts_with_all = ["source", "text"])]
        file: Option<PathBuf>,
    },

    /// Ask a single question and print the answer.
    Ask {
        /// The question to research.
        query: String,
    },

    /// Check that the research server is reachable.
    Status,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::resolve(cli.server, cli.api_key);
    let client = ApiClient::new(config)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => lectern::tui::launch(client),
        Commands::Ingest { source, text, file } => run_ingest(&client, source, text, file),
        Commands::Ask { query } => run_ask(&client, &query),
        Commands::Status => run_status(&client),
    }
}

fn run_ingest(
    client: &ApiClient,
    source: Option<String>,
    text: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let receipt = if let Some(text) = text {
        client.ingest_text(&text)?
    } else if let Some(file) = file {
        client.ingest_file(&file)?
    } else if let Some(source) = source {
        client.ingest(&source)?
    } else {
        return Err(miette::miette!(
            "nothing to ingest — pass a URL, --text, or --file"
        ));
    };

    println!("{} ({} chunks)", receipt.message, receipt.chunks_count);
    Ok(())
}

fn run_ask(client: &ApiClient, query: &str) -> Result<()> {
    let answer = client.research(query)?;
    let reply = ChatMessage::answer(
        answer.answer,
        answer.confidence_score,
        answer.source_chunk_ids,
    );

    println!("{}", reply.content);
    if let Some(confidence) = reply.confidence_label() {
        match reply.source_label() {
            Some(sources) => println!("\n[confidence {confidence} · {sources}]"),
            None => println!("\n[confidence {confidence}]"),
        }
    }
    Ok(())
}

fn run_status(client: &ApiClient) -> Result<()> {
    let report = client.health()?;
    println!("{} — {}", client.server(), report.status);
    if !report.version.is_empty() {
        println!("version: {} ({})", report.version, report.environment);
    }
    Ok(())
}
