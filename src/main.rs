use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrim_ledger::config::{AppConfig, TeamAssignment};
use scrim_ledger::engine::{ImportCoordinator, ImportError, ImportOptions, Stores};
use scrim_ledger::models::{ImportSummary, RosterAccount, TeamRecord};
use scrim_ledger::storage::{
    FileStores, LedgerStore, MappingStore, RosterStore, StorageConfig, TeamStore,
};

#[derive(Parser)]
#[command(name = "scrim-ledger")]
#[command(about = "Idempotent match-stat importer with per-player ledgers and team records")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a stat export file
    Import {
        /// Path to the exported file
        file: PathBuf,

        /// Compute the summary without persisting anything
        #[arg(long)]
        dry_run: bool,

        /// Team credited for Orange-side rows (overrides config)
        #[arg(long)]
        orange: Option<String>,

        /// Team credited for Blue-side rows (overrides config)
        #[arg(long)]
        blue: Option<String>,
    },

    /// Manage explicit name -> account mappings
    Map {
        #[command(subcommand)]
        action: MapAction,
    },

    /// Manage the account roster
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Inspect or correct team records
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Show persisted ledgers
    Ledgers,
}

#[derive(Subcommand)]
enum MapAction {
    /// Link an external name to an account
    Add {
        name: String,
        account_id: String,
    },

    /// Remove a mapping
    Remove { name: String },

    /// List all mappings
    List,
}

#[derive(Subcommand)]
enum RosterAction {
    /// Add or update a roster account
    Add {
        account_id: String,
        display_name: String,

        /// Login/account name; defaults to the display name
        #[arg(long)]
        username: Option<String>,
    },

    /// List all roster accounts
    List,
}

#[derive(Subcommand)]
enum TeamAction {
    /// Show all team records
    Show,

    /// Apply a signed correction to one team's record (clamped at zero)
    Adjust {
        team: String,

        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        wins: i64,

        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        losses: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting scrim-ledger v{}", env!("CARGO_PKG_VERSION"));

    let config_path = PathBuf::from(&cli.config);
    let mut config = if config_path.exists() {
        AppConfig::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", cli.config))?
    } else {
        AppConfig::default()
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let storage = StorageConfig::new(config.data_dir.clone());
    let mut files = FileStores::open(&storage).context("Failed to open data stores")?;

    match cli.command {
        Commands::Import {
            file,
            dry_run,
            orange,
            blue,
        } => {
            let assignment = TeamAssignment::new(
                orange.unwrap_or_else(|| config.teams.orange.clone()),
                blue.unwrap_or_else(|| config.teams.blue.clone()),
            );

            let input = File::open(&file)
                .with_context(|| format!("Failed to open export {}", file.display()))?;

            let mut coordinator = ImportCoordinator::new(Stores::from_files(&mut files), assignment);
            match coordinator.import(input, &ImportOptions { dry_run }) {
                Ok(summary) => print_summary(&summary, dry_run),
                Err(ImportError::Validation(errors)) => {
                    println!("Import aborted: the export failed validation.");
                    for message in scrim_ledger::models::render_bounded(&errors) {
                        println!("  - {}", message);
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Map { action } => match action {
            MapAction::Add { name, account_id } => {
                files.mappings.add(&name, &account_id)?;
                println!("Mapped '{}' -> {}", name.to_lowercase(), account_id);
            }
            MapAction::Remove { name } => {
                if files.mappings.remove(&name)? {
                    println!("Removed mapping for '{}'", name.to_lowercase());
                } else {
                    println!("No mapping for '{}'", name.to_lowercase());
                }
            }
            MapAction::List => {
                let mappings = files.mappings.all()?;
                if mappings.is_empty() {
                    println!("No mappings.");
                }
                for (name, account_id) in mappings {
                    println!("{} -> {}", name, account_id);
                }
            }
        },

        Commands::Roster { action } => match action {
            RosterAction::Add {
                account_id,
                display_name,
                username,
            } => {
                let account = RosterAccount {
                    username: username.unwrap_or_else(|| display_name.clone()),
                    account_id,
                    display_name,
                };
                files.roster.add(&account)?;
                println!("Added {} ({})", account.display_name, account.account_id);
            }
            RosterAction::List => {
                for account in files.roster.all()? {
                    println!(
                        "{}  {} ({})",
                        account.account_id, account.display_name, account.username
                    );
                }
            }
        },

        Commands::Team { action } => match action {
            TeamAction::Show => {
                let records = files.teams.all()?;
                if records.is_empty() {
                    println!("No team records.");
                }
                for (team, record) in records {
                    println!("{}: {}W - {}L", team, record.wins, record.losses);
                }
            }
            TeamAction::Adjust { team, wins, losses } => {
                let mut record = files.teams.get(&team)?.unwrap_or_else(TeamRecord::default);
                record.adjust(wins, losses);
                files.teams.put(&team, &record)?;
                println!("{}: {}W - {}L", team, record.wins, record.losses);
            }
        },

        Commands::Ledgers => {
            for ledger in files.ledgers.all()? {
                println!(
                    "{} ({}): {} games, {} goals, {} assists, {} saves, {} shots, {} demos, {} MVPs",
                    ledger.display_name,
                    ledger.account_id,
                    ledger.games_played,
                    ledger.goals,
                    ledger.assists,
                    ledger.saves,
                    ledger.shots,
                    ledger.demos,
                    ledger.mvps
                );
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &ImportSummary, dry_run: bool) {
    if dry_run {
        println!("Dry run (nothing persisted).");
    }
    println!(
        "Processed {} rows: {} admitted, {} duplicates skipped, {} matches.",
        summary.rows_parsed,
        summary.rows_admitted,
        summary.duplicates_skipped,
        summary.matches_seen
    );
    println!(
        "Players: {} matched, {} unmatched.",
        summary.matched.len(),
        summary.unmatched.len()
    );

    for player in &summary.matched {
        println!(
            "  {} -> {}: {} games, {} goals, {} MVPs",
            player.name,
            player.account.display_name,
            player.totals.games,
            player.totals.goals,
            player.totals.mvps
        );
    }

    if !summary.unmatched.is_empty() {
        println!("Unmatched players (not persisted; link with 'map add'):");
        for player in &summary.unmatched {
            println!(
                "  {}: {} games, {} goals, {} wins, {} losses",
                player.name,
                player.totals.games,
                player.totals.goals,
                player.totals.wins,
                player.totals.losses
            );
        }
    }

    if !summary.errors.is_empty() {
        println!("Errors during persistence:");
        for message in summary.rendered_errors() {
            println!("  - {}", message);
        }
    }
}
