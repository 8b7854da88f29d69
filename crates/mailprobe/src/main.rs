//! `mailprobe` - check that an IMAP account connects and logs in.
//!
//! Exit status is 0 when the check passes, 1 when it fails and 2 when the
//! account cannot be loaded.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use mailprobe_core::{AccountsFile, check_account};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{CheckArgs, Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mailprobe=info,mailprobe_core=info,mailprobe_imap=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let path = cli.config.clone().unwrap_or_else(AccountsFile::default_path);

    match &cli.command {
        Command::Check(args) => check(args, &path, cli.json).await,
        Command::Accounts => {
            let file = AccountsFile::load(&path).await?;
            output::print_accounts(&file.accounts, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn check(args: &CheckArgs, path: &std::path::Path, as_json: bool) -> Result<ExitCode> {
    let mut account = match args.adhoc_account()? {
        Some(account) => account,
        None => {
            debug!(path = %path.display(), "loading accounts");
            let file = AccountsFile::load(path).await?;
            match &args.account {
                Some(name) => file.find(name)?.clone(),
                None => file.default_account()?.clone(),
            }
        }
    };
    args.apply_timeouts(&mut account);

    let report = check_account(&account).await?;
    output::print_report(&report, as_json)?;

    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
