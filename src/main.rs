//! Veles CLI - client for the fixed-frame submission protocol.

use clap::Parser;
use colored::Colorize;

use veles::cli::Cli;
use veles::config::{init_logging, Config};
use veles::error::Result;
use veles::{Client, RunOutcome};

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(outcome) => {
            if outcome.is_success() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            1
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<RunOutcome> {
    let cli = Cli::parse();

    // Initialize logging
    let log_config = veles::config::LoggingConfig {
        level: cli.log_level.clone(),
        color: !cli.no_color,
        ..Default::default()
    };
    init_logging(&log_config)?;

    // Load config if specified
    let mut config = if let Some(ref path) = cli.config {
        Config::load(path)?
    } else if Config::default_path().exists() {
        Config::load(Config::default_path())?
    } else {
        Config::default()
    };

    // CLI flags override config values
    if let Some(user) = cli.user {
        config.identity.user = user;
    }
    if let Some(password) = cli.password {
        config.identity.password = password;
    }
    if let Some(name) = cli.name {
        config.identity.name = name;
    }
    if let Some(email) = cli.email {
        config.identity.email = email;
    }
    if let Some(repo) = cli.repo {
        config.identity.repo = repo;
    }
    if let Some(host) = cli.host {
        config.target.host = host;
    }
    if let Some(port) = cli.port {
        config.target.port = port;
    }
    config.validate()?;

    println!(
        "{} {} {}",
        "→".cyan(),
        "Target:".bright_white(),
        format!("{}:{}", config.target.host, config.target.port)
    );

    let host = config.target.host.clone();
    let port = config.target.port;

    let client = Client::new(config);
    let outcome = client.run(&host, port).await?;

    match &outcome {
        RunOutcome::Completed { token } => {
            println!("{} Submission accepted.", "✓".green());
            println!("  {} {}", "Token:".bright_white(), token.bright_green());
        }
        RunOutcome::Exhausted => {
            println!("{} No endpoint completed the exchange.", "✗".red());
        }
    }

    Ok(outcome)
}
