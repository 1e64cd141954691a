//! MSC sequence editor — command-line entry point.
//!
//! Drives the sequence edit engine against a running ASN.1/MSC backend
//! from the terminal.  Each invocation initializes the editor (restoring
//! local snapshots and merging the remote sequence list), performs one
//! subcommand, flushes pending snapshot writes, and exits.
//!
//! # Usage
//!
//! ```text
//! msc-editor [--backend-url URL] [--storage-dir DIR] <COMMAND>
//!
//! Commands:
//!   list       List known sequences
//!   create     Create a new sequence and make it current
//!   show       Load a sequence and print it with fresh validation
//!   validate   Validate a sequence and print the findings
//!   delete     Delete a sequence
//!   export     Export a sequence to transfer JSON on stdout
//!   import     Import a transfer JSON file as a new sequence
//!   decode     Decode hex bytes and append them to a sequence
//! ```
//!
//! The log level is controlled by the `RUST_LOG` environment variable
//! (e.g. `RUST_LOG=debug`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use msc_editor::domain::config;
use msc_editor::{EditorConfig, HttpBackend, SequenceEditor, SnapshotStore};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// MSC protocol sequence editor.
///
/// Edits message sequences stored on a remote ASN.1/MSC backend, with
/// local snapshot persistence and undo history.
#[derive(Debug, Parser)]
#[command(name = "msc-editor", about = "Sequence editor for MSC protocol exchanges", version)]
struct Cli {
    /// Base URL of the ASN.1/MSC backend.
    #[arg(long, env = "MSC_BACKEND_URL")]
    backend_url: Option<String>,

    /// Directory for local sequence snapshot files.
    #[arg(long, env = "MSC_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List known sequences (remote merged with local snapshots).
    List {
        /// Only show sequences for this protocol.
        #[arg(long)]
        protocol: Option<String>,
    },
    /// Create a new sequence and make it current.
    Create {
        /// Display name for the sequence.
        name: String,
        /// Protocol identifier (e.g. `rrc_demo`).
        protocol: String,
        /// Session to attach the sequence to.
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Load a sequence and print it with fresh validation results.
    Show {
        /// Sequence id.
        id: String,
    },
    /// Validate a sequence and print the findings.
    Validate {
        /// Sequence id.
        id: String,
    },
    /// Delete a sequence.
    Delete {
        /// Sequence id.
        id: String,
    },
    /// Export a sequence as transfer JSON on stdout.
    Export {
        /// Sequence id.
        id: String,
    },
    /// Import a transfer JSON file as a new sequence.
    Import {
        /// Path to the transfer document.
        file: PathBuf,
    },
    /// Decode hex bytes and append the result to a sequence.
    Decode {
        /// Sequence id to append to.
        id: String,
        /// Hex string of the encoded message.
        hex: String,
        /// Expected message type, if known.
        #[arg(long)]
        type_name: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // CLI flags override the config file, which overrides built-in defaults.
    let mut cfg: EditorConfig = config::load_config().context("loading editor config")?;
    if let Some(url) = cli.backend_url {
        cfg.backend_url = url;
    }
    if let Some(dir) = cli.storage_dir {
        cfg.storage_dir = Some(dir);
    }

    let backend = Arc::new(HttpBackend::new(&cfg.backend_url));
    let store = Arc::new(
        SnapshotStore::open(cfg.storage_dir().context("resolving storage directory")?)
            .context("opening snapshot store")?,
    );
    let editor = SequenceEditor::new(backend.clone(), backend, store, &cfg);

    info!(backend = %cfg.backend_url, "editor starting");
    editor.initialize().await.context("initializing editor")?;

    run_command(&editor, cli.command).await?;

    // Flush any pending debounced snapshot before exiting.
    editor.dispose().await;
    Ok(())
}

async fn run_command(editor: &SequenceEditor, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List { protocol } => {
            let state = editor.state();
            for sequence in state
                .sequences
                .iter()
                .filter(|s| protocol.as_deref().map_or(true, |p| s.protocol == p))
            {
                println!(
                    "{}  {}  [{}]  {} message(s)",
                    sequence.id,
                    sequence.name,
                    sequence.protocol,
                    sequence.messages.len()
                );
            }
        }
        Command::Create {
            name,
            protocol,
            session_id,
        } => {
            let sequence = editor
                .create_sequence(&name, &protocol, session_id.as_deref())
                .await?;
            println!("created {}", sequence.id);
        }
        Command::Show { id } => {
            let sequence = editor.load_sequence(&id).await?;
            println!("{}", serde_json::to_string_pretty(&sequence)?);
        }
        Command::Validate { id } => {
            editor.load_sequence(&id).await?;
            let results = editor.validate_sequence().await?;
            if results.is_empty() {
                println!("no findings");
            }
            for result in results {
                println!("{}", serde_json::to_string(&result)?);
            }
        }
        Command::Delete { id } => {
            let deleted = editor.delete_sequence(&id).await?;
            println!("{}", if deleted { "deleted" } else { "not found" });
        }
        Command::Export { id } => {
            editor.load_sequence(&id).await?;
            println!("{}", editor.export_sequence()?);
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let sequence = editor.import_sequence(&raw).await?;
            println!("imported as {}", sequence.id);
        }
        Command::Decode { id, hex, type_name } => {
            editor.load_sequence(&id).await?;
            let sequence = editor
                .add_message_from_hex(&hex, type_name.as_deref())
                .await?;
            let added = sequence.messages.last();
            match added {
                Some(message) => println!("decoded as {} ({})", message.type_name, message.id),
                None => println!("decode produced no message"),
            }
        }
    }
    Ok(())
}
