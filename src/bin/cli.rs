//! GA4 audience builder CLI
//!
//! Builds audience filters from landing-page URLs and fans them out across
//! GA4 properties.

use std::path::PathBuf;

use audiencer::{
    error::Result,
    models::AudiencePreset,
    pipeline::{self, AppContext, BuildRequest},
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

/// audiencer - GA4 audience builder
#[derive(Parser, Debug)]
#[command(
    name = "audiencer",
    version,
    about = "Build GA4 audiences from URL lists and apply them across properties"
)]
struct Cli {
    /// Path to storage directory containing config.toml and conditions.json
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Send GA4 calls to an in-memory client instead of the API
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by `build` and `create`.
#[derive(Args, Debug, Clone)]
struct AudienceArgs {
    /// Condition names from the catalog
    #[arg(short, long = "condition", num_args = 1..)]
    conditions: Vec<String>,

    /// Landing-page URLs
    #[arg(short, long = "url", num_args = 1..)]
    urls: Vec<String>,

    /// Audience display name
    #[arg(short, long, default_value = "")]
    name: String,

    /// Membership duration in days (default from config)
    #[arg(short, long)]
    days: Option<u32>,
}

impl AudienceArgs {
    fn into_request(self, preset: Option<String>) -> BuildRequest {
        BuildRequest {
            conditions: self.conditions,
            urls: self.urls,
            display_name: self.name,
            membership_days: self.days,
            preset,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List accounts with their properties
    Accounts,

    /// List the properties of accounts
    Properties {
        /// Account ids or `accounts/{id}` names
        #[arg(required = true)]
        accounts: Vec<String>,
    },

    /// List audiences on properties
    List {
        /// Property ids or resource names
        #[arg(required = true)]
        properties: Vec<String>,
    },

    /// Show one audience
    Get {
        /// Resource name `properties/{p}/audiences/{a}`
        name: String,
    },

    /// Build an audience definition and print it
    Build {
        #[command(flatten)]
        audience: AudienceArgs,
    },

    /// Build an audience and create it on properties
    Create {
        #[command(flatten)]
        audience: AudienceArgs,

        /// Use a built-in preset instead of conditions and URLs
        #[arg(long, conflicts_with_all = ["conditions", "urls"])]
        preset: Option<String>,

        /// Target property ids or resource names
        #[arg(short, long = "property", num_args = 1.., required = true)]
        properties: Vec<String>,
    },

    /// Archive an audience on properties
    Delete {
        /// Audience id or resource name
        audience: String,

        /// Property ids or resource names
        #[arg(short, long = "property", num_args = 1.., required = true)]
        properties: Vec<String>,
    },

    /// Active users per audience over a date range
    Report {
        /// Property ids or resource names
        #[arg(short, long = "property", num_args = 1.., required = true)]
        properties: Vec<String>,

        /// Start date (YYYY-MM-DD or relative, e.g. 30daysAgo)
        #[arg(long, default_value = "30daysAgo")]
        start: String,

        /// End date
        #[arg(long, default_value = "today")]
        end: String,
    },

    /// Export audiences of properties to a JSON file
    Export {
        /// Property ids or resource names
        #[arg(short, long = "property", num_args = 1.., required = true)]
        properties: Vec<String>,

        /// Output file
        #[arg(short, long, default_value = "audiences.json")]
        output: PathBuf,
    },

    /// List built-in presets
    Presets,

    /// Validate configuration files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // These commands never talk to GA4 and need no credentials.
    match &cli.command {
        Command::Validate => {
            let summary = pipeline::run_validate(&cli.storage_dir)?;
            return print_json(&summary);
        }
        Command::Presets => return print_json(&AudiencePreset::builtin()),
        Command::Build { audience } => {
            let assembler = pipeline::load_assembler(&cli.storage_dir)?;
            let request = audience.clone().into_request(None);
            return print_json(&pipeline::run_build(&assembler, &request)?);
        }
        _ => {}
    }

    let ctx = AppContext::load(&cli.storage_dir, cli.dry_run)?;
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    // Batch commands print their breakdown and succeed even when every
    // property failed.
    match cli.command {
        Command::Accounts => print_json(&*pipeline::run_accounts(&ctx).await?)?,

        Command::Properties { accounts } => {
            print_json(&pipeline::run_properties(&ctx, &accounts).await?)?
        }

        Command::List { properties } => print_json(&pipeline::run_list(&ctx, &properties).await?)?,

        Command::Get { name } => print_json(&pipeline::run_get(&ctx, &name).await?)?,

        Command::Create {
            audience,
            preset,
            properties,
        } => {
            let request = audience.into_request(preset);
            print_json(&pipeline::run_create(&ctx, &request, &properties).await?)?
        }

        Command::Delete {
            audience,
            properties,
        } => print_json(&pipeline::run_delete(&ctx, &properties, &audience).await?)?,

        Command::Report {
            properties,
            start,
            end,
        } => print_json(&pipeline::run_report(&ctx, &properties, &start, &end).await?)?,

        Command::Export { properties, output } => {
            let export = pipeline::run_export(&ctx, &properties, &output).await?;
            if !export.failed.is_empty() {
                print_json(&export.failed)?;
            }
        }

        Command::Validate | Command::Presets | Command::Build { .. } => {}
    }

    Ok(())
}
