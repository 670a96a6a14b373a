use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::OrderArgs;

#[derive(Parser)]
#[command(name = "gocredit")]
#[command(about = "GoCredit top-up storefront CLI", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (base -> overlays).
    /// Falls back to the comma-separated GOCREDIT_CONFIG env var.
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List data packs and the call bundle price
    Packs,

    /// Price an order without validating it
    Quote(OrderArgs),

    /// Validate an order and print field errors
    Validate(OrderArgs),

    /// Run an order through the full wizard and pay with the simulated gateway
    Order(OrderArgs),

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Order log utilities
    Audit {
        #[command(subcommand)]
        cmd: AuditCmd,
    },

    /// Print customer support contacts
    Support,
}

#[derive(Subcommand)]
enum AuditCmd {
    /// Verify the hash chain of the order log
    Verify {
        /// Log path (defaults to audit.path from config)
        #[arg(long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let config_paths = commands::resolve_config_paths(cli.config_paths);

    match cli.cmd {
        Commands::Packs => commands::catalog::print_packs(),

        Commands::Quote(args) => commands::catalog::quote(&args)?,

        Commands::Validate(args) => commands::order::validate_only(&args)?,

        Commands::Order(args) => {
            let cfg = commands::load_storefront(&config_paths)?;
            commands::order::run_order(&args, &cfg).await?;
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = gc_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Audit { cmd } => match cmd {
            AuditCmd::Verify { path } => {
                let path = match path {
                    Some(p) => PathBuf::from(p),
                    None => commands::load_storefront(&config_paths)?.audit.path,
                };
                commands::audit::verify(&path)?;
            }
        },

        Commands::Support => {
            let cfg = commands::load_storefront(&config_paths)?;
            commands::catalog::print_support(&cfg);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
