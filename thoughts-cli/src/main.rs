//! thoughts: reconcile a static site's thoughts collection.
//!
//! # Usage
//!
//! ```text
//! thoughts reconcile [--site <dir>] [--dry-run] [--json]
//! thoughts check     [--site <dir>] [--json]
//! thoughts diff      [--site <dir>]
//!
//! shared: --config <file> --data <path> --prefix-len <50..=100>
//!         --identity size|sha256 --normalize-content -v/-vv
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, diff::DiffArgs, reconcile::ReconcileArgs};
use thoughts_core::ResourceIdentity;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "thoughts",
    version,
    about = "Deduplicate, merge and sort a thoughts YAML collection",
    long_about = None,
)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile the collection and write it back in canonical form.
    Reconcile(ReconcileArgs),

    /// Report what a reconcile would change; exit non-zero if anything.
    Check(CheckArgs),

    /// Show a unified diff between the collection and its canonical form.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Shared ResourceIdentity argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `ResourceIdentity` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityArg(pub ResourceIdentity);

impl FromStr for IdentityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "size" => Ok(Self(ResourceIdentity::Size)),
            "sha256" => Ok(Self(ResourceIdentity::Sha256)),
            other => Err(format!(
                "unknown identity '{other}'; expected: size, sha256"
            )),
        }
    }
}

impl fmt::Display for IdentityArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<IdentityArg> for ResourceIdentity {
    fn from(arg: IdentityArg) -> Self {
        arg.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Reconcile(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}
