//! SolVanity CLI
//!
//! Solana vanity address service built on `solana-keygen grind`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use solvanity_core::{
    tool_version, GrindError, GrindSession, MnemonicLanguage, SearchConstraints, SessionConfig, StreamEvent,
    ToolCommand, WordCount,
};
use solvanity_web::{serve_web, WebConfig};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(name = "solvanity")]
#[command(author = "SolVanity Team")]
#[command(version = "0.1.0")]
#[command(about = "Solana vanity address generator", long_about = None)]
struct Cli {
    #[command(flatten)]
    tools: ToolArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ToolArgs {
    /// solana-keygen binary
    #[arg(long, global = true, env = "SOLVANITY_KEYGEN_BIN", default_value = "solana-keygen")]
    keygen_bin: PathBuf,

    /// solana CLI binary (version probe)
    #[arg(long, global = true, env = "SOLVANITY_SOLANA_BIN", default_value = "solana")]
    solana_bin: PathBuf,

    /// Parent directory for per-request scratch directories [default: system temp dir]
    #[arg(long, global = true, env = "SOLVANITY_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Maximum time per search in seconds (0 = unlimited)
    #[arg(long, global = true, env = "SOLVANITY_MAX_RUNTIME_SECS", default_value = "0")]
    max_runtime_secs: u64,
}

impl ToolArgs {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            keygen: ToolCommand::new(&self.keygen_bin),
            work_root: self.work_dir.clone().unwrap_or_else(std::env::temp_dir),
            max_runtime_secs: self.max_runtime_secs,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "SOLVANITY_BIND", default_value = "127.0.0.1:3000")]
        bind: String,
    },

    /// Run one search and print its events as NDJSON on stdout
    Grind {
        /// Address must start with this
        #[arg(short, long)]
        prefix: Option<String>,

        /// Address must end with this
        #[arg(short, long)]
        suffix: Option<String>,

        /// Number of matching keypairs to ask the grinder for
        #[arg(short, long, default_value = "1")]
        count: u32,

        /// Case insensitive search
        #[arg(short = 'i', long)]
        ignore_case: bool,

        /// Derive the keypair from a seed phrase
        #[arg(long)]
        use_mnemonic: bool,

        /// Seed phrase length (12, 15, 18, 21, 24)
        #[arg(long, requires = "use_mnemonic")]
        word_count: Option<WordCount>,

        /// Seed phrase language
        #[arg(long, requires = "use_mnemonic")]
        language: Option<MnemonicLanguage>,

        /// Grinder threads (default: the tool's own choice)
        #[arg(long)]
        threads: Option<u32>,
    },

    /// Print the installed Solana CLI version
    ToolVersion,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays NDJSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let config = WebConfig {
                session: cli.tools.session_config(),
                solana: ToolCommand::new(&cli.tools.solana_bin),
            };
            serve_web(config, &bind).await?;
        }
        Commands::Grind {
            prefix,
            suffix,
            count,
            ignore_case,
            use_mnemonic,
            word_count,
            language,
            threads,
        } => {
            let constraints = SearchConstraints {
                prefix,
                suffix,
                count,
                ignore_case,
                use_mnemonic,
                word_count,
                language,
                threads,
            };
            cmd_grind(constraints, cli.tools.session_config()).await?;
        }
        Commands::ToolVersion => {
            let version = tool_version(&ToolCommand::new(&cli.tools.solana_bin)).await?;
            println!("{}", version);
        }
    }

    Ok(())
}

async fn cmd_grind(constraints: SearchConstraints, config: SessionConfig) -> Result<()> {
    let session = GrindSession::new(constraints, config)?;
    let (tx, mut rx) = mpsc::channel::<StreamEvent>(64);
    let handle = tokio::spawn(session.run(tx));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut interrupted = false;
    let mut stdout = std::io::stdout().lock();
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => {
                    stdout.write_all(event.to_line()?.as_bytes())?;
                    stdout.flush()?;
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping grinder");
                interrupted = true;
                break;
            }
        }
    }
    // Closing the receiver makes the session kill the grinder
    drop(rx);

    let outcome = handle.await.context("grind task panicked")?;
    finish_grind(outcome.map(|_| ()), interrupted)
}

/// Ctrl-C closes the event channel, which the session reports as a disconnect
fn finish_grind(outcome: Result<(), GrindError>, interrupted: bool) -> Result<()> {
    match outcome {
        Err(GrindError::Disconnected) if interrupted => {
            info!("Search interrupted, grinder stopped");
            Ok(())
        }
        other => other.map_err(Into::into),
    }
}
