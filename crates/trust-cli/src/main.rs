// ============================================================================
// trust-notes - command-line frontend for TRUST Notes
// ============================================================================
// Usage:
//   trust-notes gate --balance 0.01             Evaluate the token gate
//   trust-notes network [--chain-id 8453]       Check a network id
//   trust-notes balance --address 0x...         Look up a $TRUST balance
//   trust-notes connect [--refresh]             Connect through the RPC wallet
//   trust-notes notes list --address 0x...      Manage notes (gated)
// ============================================================================

use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tracing::{debug, info};
use trust_core::access::format_token_balance;
use trust_core::{
    AppConfig, BalanceSource, ConnectionSession, Erc20BalanceSource, GateStatus, Identity,
    IdentityProvider, JsonRpcProvider, NetworkValidator, Note, NoteDraft, NoteSort, NoteStore,
    Notice, SessionSnapshot, StaticBalanceSource, TokenGate,
};

/// Token-gated notes backed by a $TRUST balance check
#[derive(Parser)]
#[command(name = "trust-notes", version, about = "Token-gated notes for $TRUST holders")]
struct Cli {
    /// Wallet address to act as
    #[arg(long, global = true)]
    address: Option<String>,

    /// Use this fixed balance instead of querying the token contract
    #[arg(long, global = true, value_parser = parse_amount)]
    balance: Option<f64>,

    /// Path to the notes database (default: ~/.trust-notes/notes.redb)
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the token gate for a balance
    Gate {
        /// Override the configured minimum balance
        #[arg(long, value_parser = parse_amount)]
        threshold: Option<f64>,
    },

    /// Check whether a network is supported (queries the RPC when no id given)
    Network {
        #[arg(long)]
        chain_id: Option<u64>,
    },

    /// Look up the token balance for --address
    Balance,

    /// Connect through the JSON-RPC wallet and report the session
    Connect {
        /// Refresh the balance once after connecting
        #[arg(long)]
        refresh: bool,
    },

    /// Manage notes (requires access)
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List notes, optionally filtered and sorted
    List {
        /// Case-insensitive search over title, content and tags
        #[arg(long)]
        query: Option<String>,

        /// newest, oldest, updated, title-asc, title-desc
        #[arg(long, default_value = "newest")]
        sort: NoteSort,
    },

    /// Show a single note
    Show { id: String },

    /// Create a note
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Repeatable, at most 5
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Replace a note's title, content and tags
    Edit {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Copy a note
    Duplicate { id: String },

    /// Delete a note
    Delete { id: String },
}

/// Token amounts must be finite and non-negative
fn parse_amount(raw: &str) -> std::result::Result<f64, String> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("'{}' is not a valid token amount", raw));
    }
    Ok(amount)
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("trust_notes={}", level).parse()?)
                .add_directive(format!("trust_core={}", level).parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = AppConfig::from_env()?;
    if cli.db_path.is_some() {
        config.db_path = cli.db_path.clone();
    }
    debug!("Using RPC endpoint {}", config.rpc_url);

    match &cli.command {
        Commands::Gate { threshold } => cmd_gate(&cli, &config, *threshold),
        Commands::Network { chain_id } => cmd_network(&cli, &config, *chain_id).await,
        Commands::Balance => cmd_balance(&cli, &config).await,
        Commands::Connect { refresh } => cmd_connect(&cli, &config, *refresh).await,
        Commands::Notes { command } => cmd_notes(&cli, &config, command).await,
    }
}

fn balance_source(cli: &Cli, config: &AppConfig) -> Arc<dyn BalanceSource> {
    match cli.balance {
        Some(balance) => Arc::new(StaticBalanceSource::new(balance)),
        None => Arc::new(Erc20BalanceSource::new(&config.rpc_url, &config.token)),
    }
}

fn require_address(cli: &Cli) -> Result<Identity> {
    let raw = cli
        .address
        .as_deref()
        .ok_or_else(|| anyhow!("--address is required for this command"))?;
    Ok(Identity::parse(raw)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_timestamp(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| format!("(invalid: {})", ms))
}

fn print_gate(status: &GateStatus, balance: f64, gate: &TokenGate) {
    let symbol = &gate.config().symbol;
    println!("=== Token Gate Status ===");
    println!("Balance:  {} {}", format_token_balance(balance), symbol);
    println!("Required: {} {}", format_token_balance(gate.threshold()), symbol);
    println!("Status:   {}", status.status.display_name());
    if !status.is_granted() {
        println!("Progress: {:.0}%", status.progress);
    }
    println!("{}", status.message);
}

fn print_notices(notices: &mut Receiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        eprintln!("[{}] {}", notice.title, notice.description);
    }
}

fn cmd_gate(cli: &Cli, config: &AppConfig, threshold: Option<f64>) -> Result<()> {
    let balance = cli
        .balance
        .ok_or_else(|| anyhow!("--balance is required for the gate command"))?;

    let mut token = config.token.clone();
    if let Some(threshold) = threshold {
        token.minimum_balance = threshold;
    }
    let gate = TokenGate::new(token);
    let status = gate.evaluate(balance);

    if cli.json {
        return print_json(&status);
    }
    print_gate(&status, balance, &gate);
    Ok(())
}

async fn cmd_network(cli: &Cli, config: &AppConfig, chain_id: Option<u64>) -> Result<()> {
    let validator = NetworkValidator::new(config.networks.clone());

    let validation = match chain_id {
        Some(id) => validator.check_chain_id(id),
        None => {
            let provider = JsonRpcProvider::new(&config.rpc_url);
            validator
                .validate(Some(&provider as &dyn IdentityProvider))
                .await
        }
    };

    if cli.json {
        return print_json(&validation);
    }

    let networks = validator.networks();
    match (validation.is_supported, validation.current_network) {
        (true, Some(id)) => {
            let name = networks
                .get(id)
                .map(|n| n.name.as_str())
                .unwrap_or("unknown");
            println!("Network {} ({}) is supported", id, name);
        }
        _ => {
            println!(
                "{}",
                validation
                    .error
                    .unwrap_or_else(|| "Network not supported".to_string())
            );
            println!("\nSupported networks:");
            for (id, network) in networks.iter() {
                println!("  {:<8} {:<14} {}", id, network.name, network.block_explorer);
            }
        }
    }
    Ok(())
}

async fn cmd_balance(cli: &Cli, config: &AppConfig) -> Result<()> {
    let identity = require_address(cli)?;
    let check = balance_source(cli, config).fetch_balance(&identity).await;

    if cli.json {
        return print_json(&check);
    }

    let balance = check.into_result()?;
    let gate = TokenGate::new(config.token.clone());
    let status = gate.evaluate(balance);
    println!("Wallet:   {}", identity.short());
    print_gate(&status, balance, &gate);
    Ok(())
}

async fn cmd_connect(cli: &Cli, config: &AppConfig, refresh: bool) -> Result<()> {
    let provider: Arc<dyn IdentityProvider> = Arc::new(JsonRpcProvider::new(&config.rpc_url));
    let session = ConnectionSession::from_config(Some(provider), balance_source(cli, config), config);
    let mut notices = session.subscribe();

    let result = session.connect().await;
    print_notices(&mut notices);
    let mut outcome = result?;

    if refresh {
        outcome = session.refresh().await?;
        print_notices(&mut notices);
    }

    if cli.json {
        return print_json(&outcome);
    }
    print_session(&outcome.snapshot, session.gate());
    Ok(())
}

fn print_session(snapshot: &SessionSnapshot, gate: &TokenGate) {
    println!("=== Wallet Session ===");
    println!("Phase:    {:?}", snapshot.phase);
    println!("Wallet:   {}", snapshot.identity.short());
    if let Some(warning) = &snapshot.warning {
        println!("Warning:  {}", warning);
    }
    if let Some(status) = &snapshot.gate {
        println!();
        print_gate(status, snapshot.balance, gate);
    }
}

async fn cmd_notes(cli: &Cli, config: &AppConfig, command: &NotesCommand) -> Result<()> {
    let identity = require_address(cli)?;

    let balance = balance_source(cli, config)
        .fetch_balance(&identity)
        .await
        .into_result()?;
    TokenGate::new(config.token.clone()).require_access(balance)?;
    info!("Access granted for {}", identity.short());

    let store = NoteStore::open(config.db_path.as_deref())?;

    match command {
        NotesCommand::List { query, sort } => {
            let notes = store.list(&identity, query.as_deref(), *sort)?;
            if cli.json {
                return print_json(&notes);
            }
            if notes.is_empty() {
                println!("No notes found.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<20}  {:<24}  {}",
                "NOTE ID", "UPDATED", "TITLE", "TAGS"
            );
            println!("{}", "-".repeat(96));
            for note in &notes {
                let title = note.title.chars().take(24).collect::<String>();
                println!(
                    "{:<36}  {:<20}  {:<24}  {}",
                    note.id,
                    format_timestamp(note.updated_at),
                    title,
                    note.tags.join(", ")
                );
            }
            println!("\nTotal: {} notes ({})", notes.len(), sort.label());
            Ok(())
        }
        NotesCommand::Show { id } => {
            let note = store
                .get(&identity, id)?
                .ok_or_else(|| anyhow!("Note not found: {}", id))?;
            print_note(cli, &note)
        }
        NotesCommand::Create {
            title,
            content,
            tags,
        } => {
            let draft = NoteDraft::new(title.as_str(), content.as_str()).with_tags(tags.iter().cloned());
            let note = store.create(&identity, draft)?;
            print_note(cli, &note)
        }
        NotesCommand::Edit {
            id,
            title,
            content,
            tags,
        } => {
            let draft = NoteDraft::new(title.as_str(), content.as_str()).with_tags(tags.iter().cloned());
            let note = store.update(&identity, id, draft)?;
            print_note(cli, &note)
        }
        NotesCommand::Duplicate { id } => {
            let note = store.duplicate(&identity, id)?;
            print_note(cli, &note)
        }
        NotesCommand::Delete { id } => {
            if !store.delete(&identity, id)? {
                return Err(anyhow!("Note not found: {}", id));
            }
            println!("Deleted note {}", id);
            Ok(())
        }
    }
}

fn print_note(cli: &Cli, note: &Note) -> Result<()> {
    if cli.json {
        return print_json(note);
    }
    println!("{}  [{}]", note.title, note.id);
    println!(
        "Created {}, updated {}",
        format_timestamp(note.created_at),
        format_timestamp(note.updated_at)
    );
    if !note.tags.is_empty() {
        println!("Tags: {}", note.tags.join(", "));
    }
    println!();
    println!("{}", note.content);
    Ok(())
}
