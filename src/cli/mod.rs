//! CLI interface for Veles.

use std::path::PathBuf;

use clap::Parser;

/// Veles - client for the fixed-frame submission protocol
#[derive(Parser, Debug)]
#[command(
    name = "veles",
    author,
    version,
    about = "Run the login/submission/logout exchange against a submission server",
    long_about = r#"
Veles resolves the target hostname, then tries each resolved address in
order: connect, log in, submit, log out. The first address that completes
the exchange wins; unreachable or aborting addresses fall through to the
next candidate.

QUICK START:
  veles --user you@example.com --password secret \
        --name "Your Name" --email you@example.com \
        --repo https://example.com/you/submission
"#
)]
pub struct Cli {
    /// Target hostname (defaults to the configured target)
    pub host: Option<String>,

    /// Target port (defaults to the configured target)
    pub port: Option<u16>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Login user
    #[arg(long)]
    pub user: Option<String>,

    /// Login password
    #[arg(long)]
    pub password: Option<String>,

    /// Submission: operator name
    #[arg(long)]
    pub name: Option<String>,

    /// Submission: contact email
    #[arg(long)]
    pub email: Option<String>,

    /// Submission: repository URL
    #[arg(long)]
    pub repo: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
