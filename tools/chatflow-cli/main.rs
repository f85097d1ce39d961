use anyhow::Context;
use chatflow::prelude::*;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Run conversation graphs exported from the flow editor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Optional JSON file overriding the interpreter's built-in prompts
    #[arg(short, long, global = true)]
    prompts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one conversation on this terminal
    Run {
        /// Editor JSON export, or a `.bin` snapshot
        graph: PathBuf,
    },
    /// Convert an editor JSON export into a binary snapshot
    Snapshot { graph: PathBuf, output: PathBuf },
    /// Serve conversations over TCP, one session per connection
    Serve {
        /// Directory holding `<project>.json` or `<project>.bin` graphs
        #[arg(short, long, default_value = "graphs")]
        graphs: PathBuf,
        #[arg(short, long, default_value = "127.0.0.1:7070")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let prompts = match &cli.prompts {
        Some(path) => Prompts::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!(
                "Failed to load prompts from '{}': {}",
                path.display(),
                e
            ))
        }),
        None => Prompts::default(),
    };

    match cli.command {
        Command::Run { graph } => run_console(&graph, prompts).await,
        Command::Snapshot { graph, output } => {
            write_snapshot(&graph, &output);
            Ok(())
        }
        Command::Serve { graphs, addr } => serve(graphs, addr, prompts).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "chatflow=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Loads either an editor export or a snapshot, judged by extension.
fn load_definition(path: &Path) -> FlowDefinition {
    let load_start = Instant::now();
    let definition = if path.extension().is_some_and(|ext| ext == "bin") {
        FlowDefinition::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load snapshot: {}", e)))
    } else {
        let json = std::fs::read_to_string(path).unwrap_or_else(|e| {
            exit_with_error(&format!(
                "Failed to read graph file '{}': {}",
                path.display(),
                e
            ))
        });
        EditorGraph::from_json(&json)
            .and_then(IntoFlow::into_flow)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to convert graph: {}", e)))
    };
    info!(
        nodes = definition.nodes.len(),
        links = definition.links.len(),
        "loaded graph in {:?}",
        load_start.elapsed()
    );
    definition
}

/// External calls give up after 30 seconds instead of stalling the session.
fn http_fetcher() -> anyhow::Result<HttpFetcher> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;
    Ok(HttpFetcher::with_client(client))
}

async fn run_console(graph: &Path, prompts: Prompts) -> anyhow::Result<()> {
    let flow = Flow::new(load_definition(graph));
    let mut interpreter = Interpreter::builder(flow, ConsoleTransport::stdio())
        .with_fetcher(http_fetcher()?)
        .with_prompts(prompts)
        .build();

    let outcome = interpreter.run().await;
    info!(visited = outcome.visited.len(), "conversation finished");
    if let Some(error) = outcome.termination.error() {
        exit_with_error(&error.to_string());
    }
    Ok(())
}

fn write_snapshot(graph: &Path, output: &Path) {
    let definition = load_definition(graph);
    definition
        .save(output)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write snapshot: {}", e)));
    println!("  -> Wrote snapshot to '{}'", output.display());
}

async fn serve(graphs: PathBuf, addr: SocketAddr, prompts: Prompts) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("serving graphs from '{}' on {}", graphs.display(), addr);

    let source: Arc<dyn GraphSource> = Arc::new(DirectorySource::new(graphs));
    let fetcher: Arc<dyn Fetcher> = Arc::new(http_fetcher()?);
    let prompts = Arc::new(prompts);

    loop {
        let (stream, peer) = listener.accept().await?;
        let source = Arc::clone(&source);
        let fetcher = Arc::clone(&fetcher);
        let prompts = Arc::clone(&prompts);
        tokio::spawn(async move {
            info!(%peer, "connection opened");
            if let Err(e) = session(stream, source, fetcher, prompts.as_ref().clone()).await {
                warn!(%peer, "session ended early: {}", e);
            }
            info!(%peer, "connection closed");
        });
    }
}

/// One connection: wait for the client to name a project, then run it.
async fn session(
    stream: TcpStream,
    source: Arc<dyn GraphSource>,
    fetcher: Arc<dyn Fetcher>,
    prompts: Prompts,
) -> anyhow::Result<()> {
    let (reader, writer) = stream.into_split();
    let mut transport = DuplexTransport::new(BufReader::new(reader), writer);

    let project = transport.await_start().await?;
    let definition = match source.resolve(&project).await {
        Ok(definition) => definition,
        Err(e) => {
            error!(project = %project, "could not resolve project: {}", e);
            transport.send_error(&e.to_string()).await;
            transport.close().await;
            return Ok(());
        }
    };

    let mut interpreter = Interpreter::builder(Flow::new(definition), transport)
        .with_shared_fetcher(fetcher)
        .with_prompts(prompts)
        .build();
    let outcome = interpreter.run().await;
    info!(
        project = %project,
        visited = outcome.visited.len(),
        completed = outcome.termination.is_completed(),
        "session finished"
    );
    Ok(())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
