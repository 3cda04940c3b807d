//! `StockTally` - terminal inventory tally with e-mailed reports.
//!
//! Run without arguments for the interactive prompt, or
//! `stocktally login <user>` to store SMTP credentials in the system keyring.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod app;
mod command;
mod view;

use std::io::{BufRead, IsTerminal, Write as _};

use anyhow::Context;
use clap::{Parser, Subcommand};
use stocktally_core::settings::KeyringSource;
use stocktally_core::{
    ProfileCatalog, Session, SettingKey, SmtpDelivery, SmtpSettings, TemplateStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{Outcome, StockTally};
use command::Command;

#[derive(Parser)]
#[command(name = "stocktally", version)]
#[command(about = "Tally inventory and e-mail a report grouped by category")]
struct Cli {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum CliCommand {
    /// Store SMTP credentials in the system keyring
    Login {
        /// SMTP user, also used as the From address
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not mix with prompt output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stocktally=info,stocktally_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        None => run().await,
        Some(CliCommand::Login { user }) => login(&user),
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting StockTally");

    let catalog = match ProfileCatalog::default_path() {
        Some(path) => ProfileCatalog::load(&path)
            .with_context(|| format!("Failed to load profiles from {}", path.display()))?,
        None => ProfileCatalog::builtin(),
    };
    let settings = SmtpSettings::from_environment();
    let can_deliver = settings.has_credentials();

    let (session, warnings) = Session::new(catalog, TemplateStore::default_location());
    let mut app = StockTally::new(session, SmtpDelivery::new(settings), can_deliver);

    println!("{}", app.banner());
    for warning in warnings {
        println!("Warning: {warning}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match app.update(command).await {
            Outcome::Continue(text) => println!("{text}"),
            Outcome::Quit => break,
        }
    }

    info!("Exiting StockTally");
    Ok(())
}

fn login(user: &str) -> anyhow::Result<()> {
    let password = if std::io::stdin().is_terminal() {
        rpassword::prompt_password(format!("SMTP password for {user}: "))
            .context("Failed to read password")?
    } else {
        read_password(std::io::stdin().lock())?
    };
    let password = non_empty(password)?;

    let keyring = KeyringSource::new();
    keyring
        .store(SettingKey::User, user)
        .context("Failed to store SMTP user in keyring")?;
    keyring
        .store(SettingKey::Password, &password)
        .context("Failed to store SMTP password in keyring")?;

    println!("Stored SMTP credentials for {user}.");
    Ok(())
}

/// First line of piped input.
fn read_password(mut input: impl BufRead) -> anyhow::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn non_empty(password: String) -> anyhow::Result<String> {
    anyhow::ensure!(!password.is_empty(), "No password given");
    Ok(password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_arguments_runs_prompt() {
        let cli = Cli::try_parse_from(["stocktally"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_cli_login() {
        let cli = Cli::try_parse_from(["stocktally", "login", "counter@example.com"]).unwrap();
        assert_eq!(
            cli.command,
            Some(CliCommand::Login {
                user: "counter@example.com".to_string()
            })
        );
    }

    #[test]
    fn test_cli_rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["stocktally", "login"]).is_err());
        assert!(Cli::try_parse_from(["stocktally", "frobnicate"]).is_err());
    }

    #[test]
    fn test_read_password_from_pipe() {
        let password = read_password(std::io::Cursor::new("s3cret\r\nignored\n")).unwrap();
        assert_eq!(password, "s3cret");
    }

    #[test]
    fn test_empty_password_rejected() {
        let password = read_password(std::io::Cursor::new("")).unwrap();
        assert!(non_empty(password).is_err());
        assert_eq!(non_empty("pw".to_string()).unwrap(), "pw");
    }
}
