//! `toolrelay` command line: run the dispatch server, ask a question, or
//! print the tool catalog.

use std::io::{self, BufRead, IsTerminal, Read, Write};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use toolrelay::rdispatch;
use toolrelay::{
    Orchestrator, RelayConfig, build_dispatch_server, build_dispatcher, build_orchestrator,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "toolrelay", version, about = "Model-driven tool orchestration")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    relay: RelayConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the tool catalog over HTTP.
    Serve,
    /// Answer a question, reading it from the arguments, piped stdin, or a prompt.
    Ask {
        question: Vec<String>,
    },
    /// Print the tool catalog as JSON.
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve => serve(&cli.relay).await,
        Command::Ask { question } => ask(&cli.relay, question).await,
        Command::Tools => tools(&cli.relay).await,
    }
}

fn init_tracing(verbose: u8) {
    let filter = match std::env::var_os("RUST_LOG") {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn serve(config: &RelayConfig) -> Result<()> {
    let server = build_dispatch_server(config)?;
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let addr = listener.local_addr()?;

    info!(%addr, tools = server.registry().len(), "dispatch server listening");
    eprintln!("toolrelay dispatch server listening on http://{addr}");

    rdispatch::serve(server, listener, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
    })
    .await
    .context("dispatch server failed")
}

async fn ask(config: &RelayConfig, question: Vec<String>) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;

    let question = question.join(" ");
    if !question.trim().is_empty() {
        return answer(&orchestrator, &question).await;
    }

    if !io::stdin().is_terminal() {
        let mut piped = String::new();
        io::stdin()
            .read_to_string(&mut piped)
            .context("failed to read question from stdin")?;
        if piped.trim().is_empty() {
            bail!("no question given on stdin");
        }
        return answer(&orchestrator, &piped).await;
    }

    interactive(&orchestrator).await
}

async fn interactive(orchestrator: &Orchestrator) -> Result<()> {
    println!("Ask a question (type 'exit' or 'quit' to leave).");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_ascii_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        // A failed question should not end the session.
        if let Err(error) = answer(orchestrator, line).await {
            eprintln!("error: {error:#}");
        }
    }

    Ok(())
}

async fn answer(orchestrator: &Orchestrator, question: &str) -> Result<()> {
    match orchestrator.answer(question).await {
        Ok(outcome) => {
            println!("{}", outcome.answer);
            Ok(())
        }
        Err(error) => {
            if let Some(envelope) = &error.envelope {
                eprintln!("{}", envelope.to_pretty_json());
            }
            Err(error.into())
        }
    }
}

async fn tools(config: &RelayConfig) -> Result<()> {
    let binding = build_dispatcher(config).await?;
    let catalog: Vec<_> = binding.registry.list().collect();
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}
