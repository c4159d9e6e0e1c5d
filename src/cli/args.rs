//! Clap argument types.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Generate and check offline license keys.
#[derive(Parser, Debug)]
#[command(name = "sitekey", version, about)]
pub struct Cli {
    /// Additional configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate license keys (secret read from the configured env var).
    Generate(GenerateArgs),

    /// Verify a license key on this machine.
    Verify(VerifyArgs),

    /// Print this machine's binding fingerprint.
    Fingerprint(FingerprintArgs),
}

#[derive(Parser, Debug)]
#[command(group(
    ArgGroup::new("selection")
        .required(true)
        .multiple(true)
        .args(["disciplines", "all"]),
))]
pub struct GenerateArgs {
    /// Discipline name or code (ES, CS, RS, GM). May be repeated.
    #[arg(long = "disc")]
    pub disciplines: Vec<String>,

    /// Generate for all disciplines.
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// Do not bind to this machine (only works if the app accepts unbound keys).
    #[arg(long, default_value_t = false)]
    pub no_bind: bool,

    /// Override the device binding token (advanced).
    #[arg(long)]
    pub device: Option<String>,

    /// How many keys per discipline.
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Generate DEV- keys (work only in development builds).
    #[arg(long, default_value_t = false)]
    pub dev: bool,

    /// Ungrouped body length (defaults to the configured value).
    #[arg(long)]
    pub body_length: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// The key to check.
    pub key: String,

    /// Require the key to belong to this discipline.
    #[arg(long = "disc")]
    pub discipline: Option<String>,

    /// Check the key as an unbound key only.
    #[arg(long, default_value_t = false)]
    pub no_bind: bool,

    /// Verify against this device token instead of the local fingerprint.
    #[arg(long)]
    pub device: Option<String>,

    /// Fall back to the unbound form if the bound form does not match.
    #[arg(long, default_value_t = false)]
    pub accept_unbound: bool,

    /// Accept DEV- keys, as a development build would. Requires a build with
    /// the `dev-keys` feature.
    #[arg(long, default_value_t = false)]
    pub dev_mode: bool,

    /// Print the result as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct FingerprintArgs {
    /// Show what an override would produce instead of reading the platform.
    #[arg(long)]
    pub device: Option<String>,

    /// Print the fingerprint and its source as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
