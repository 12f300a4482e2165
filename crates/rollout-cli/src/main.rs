//! dpp-rollout
//!
//! Inspects tenant surface rollout decisions and manages local overrides.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dpp_rollout::{
    FileOverrideStore, LocalOverrides, RolloutConfig, RolloutSettings, SurfaceFlags, TenantId,
    init_logging, resolve_rollout,
};
use tracing::{info, warn};

/// Default location of the local override file.
const DEFAULT_OVERRIDE_FILE: &str = ".dpp-rollout-overrides.json";

#[derive(Debug, Parser)]
#[command(name = "dpp-rollout")]
#[command(about = "Resolve tenant surface rollout decisions")]
struct Cli {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "DPP_ROLLOUT_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// File holding local overrides.
    #[arg(
        long,
        env = "DPP_ROLLOUT_OVERRIDE_FILE",
        default_value = DEFAULT_OVERRIDE_FILE,
        global = true
    )]
    override_file: PathBuf,

    #[command(flatten)]
    settings: RolloutSettings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the rollout decision for each tenant as JSON.
    Resolve {
        /// Tenant slugs. Resolves the empty tenant when none are given.
        tenants: Vec<String>,

        /// Indent the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration as JSON.
    Config,

    /// Manage local overrides.
    #[command(subcommand)]
    Override(OverrideCommand),
}

#[derive(Debug, Subcommand)]
enum OverrideCommand {
    /// Pin a tenant's surfaces. Unspecified surfaces are enabled.
    Set {
        tenant: String,

        #[command(flatten)]
        surfaces: SurfaceArgs,
    },

    /// Remove local overrides.
    Clear {
        /// Tenant whose override is removed.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        tenant: Option<String>,

        /// Remove every override.
        #[arg(long)]
        all: bool,
    },

    /// Print all local overrides as JSON.
    List,
}

#[derive(Debug, Args)]
struct SurfaceArgs {
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    publisher: bool,

    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    editor: bool,

    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    viewer: bool,
}

impl From<&SurfaceArgs> for SurfaceFlags {
    fn from(args: &SurfaceArgs) -> Self {
        SurfaceFlags {
            publisher: args.publisher,
            editor: args.editor,
            viewer: args.viewer,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = RolloutConfig::from_settings(&cli.settings);
    for finding in config.lint() {
        warn!("{}", finding);
    }

    let store = FileOverrideStore::new(&cli.override_file);

    match &cli.command {
        Command::Resolve { tenants, pretty } => resolve(&config, &store, tenants, *pretty),
        Command::Config => print_json(&serde_json::to_value(&config)?, true),
        Command::Override(command) => run_override(command, &store),
    }
}

/// Resolves each tenant against the configuration and local overrides.
fn resolve(
    config: &RolloutConfig,
    store: &FileOverrideStore,
    tenants: &[String],
    pretty: bool,
) -> anyhow::Result<()> {
    let slugs: Vec<Option<&str>> = if tenants.is_empty() {
        vec![None]
    } else {
        tenants.iter().map(|t| Some(t.as_str())).collect()
    };

    for slug in slugs {
        let decision = resolve_rollout(slug, config, store);
        print_json(&serde_json::to_value(&decision)?, pretty)?;
    }
    Ok(())
}

fn run_override(command: &OverrideCommand, store: &FileOverrideStore) -> anyhow::Result<()> {
    let mut overrides = LocalOverrides::load(store);

    match command {
        OverrideCommand::Set { tenant, surfaces } => {
            let tenant = TenantId::new(tenant);
            let flags = SurfaceFlags::from(surfaces);
            overrides.insert(tenant.clone(), flags);
            save(&overrides, store)?;
            info!(tenant = %tenant, ?flags, "Local override set");
        }
        OverrideCommand::Clear { tenant, all } => {
            if *all {
                overrides = LocalOverrides::new();
                info!("All local overrides cleared");
            } else if let Some(tenant) = tenant {
                let tenant = TenantId::new(tenant);
                if overrides.remove(&tenant).is_none() {
                    warn!(tenant = %tenant, "No local override to clear");
                }
            }
            save(&overrides, store)?;
        }
        OverrideCommand::List => {
            print_json(&overrides.to_json(), true)?;
        }
    }

    Ok(())
}

fn save(overrides: &LocalOverrides, store: &FileOverrideStore) -> anyhow::Result<()> {
    overrides.save(store).with_context(|| {
        format!(
            "Failed to write local overrides to {}",
            store.path().display()
        )
    })
}

fn print_json(value: &serde_json::Value, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
