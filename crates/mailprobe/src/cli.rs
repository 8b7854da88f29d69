//! Command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use mailprobe_core::{Account, Auth, ImapConfig};

/// Check that IMAP accounts are reachable and accept their credentials.
#[derive(Parser, Debug)]
#[command(name = "mailprobe", author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Accounts file to read instead of the default one
    #[arg(long, short, global = true, value_name = "PATH", env = "MAILPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to an account and log in
    Check(CheckArgs),

    /// List the configured accounts
    Accounts,
}

/// Which account to check.
///
/// Without `--host` the account comes from the accounts file: the one named
/// by `--account`, or the default one.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Account name or email address from the accounts file
    #[arg(long, short, conflicts_with = "host")]
    pub account: Option<String>,

    /// IMAP server host, for a check without the accounts file
    #[arg(long, requires = "username")]
    pub host: Option<String>,

    /// IMAP server port (defaults to the security mode's port)
    #[arg(long, requires = "host")]
    pub port: Option<u16>,

    /// Connection security: tls, starttls or none
    #[arg(long, default_value = "tls", requires = "host")]
    pub security: mailprobe_imap::Security,

    /// Login name
    #[arg(long, short, requires = "host")]
    pub username: Option<String>,

    /// Environment variable holding the password
    #[arg(long, value_name = "VAR", conflicts_with = "oauth2_token_env")]
    pub password_env: Option<String>,

    /// Environment variable holding an OAuth2 access token
    #[arg(long, value_name = "VAR")]
    pub oauth2_token_env: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// Per-command timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub io_timeout: Option<u64>,
}

impl CheckArgs {
    /// Builds an account from the ad-hoc flags, if `--host` was given.
    pub fn adhoc_account(&self) -> Result<Option<Account>> {
        let (Some(host), Some(username)) = (&self.host, &self.username) else {
            return Ok(None);
        };

        let auth = match (&self.password_env, &self.oauth2_token_env) {
            (Some(var), None) => Auth::Password {
                password: read_env(var)?,
            },
            (None, Some(var)) => Auth::OAuth2 {
                token: read_env(var)?,
            },
            _ => bail!("--host needs --password-env or --oauth2-token-env"),
        };

        let email = if username.contains('@') {
            username.clone()
        } else {
            format!("{username}@{host}")
        };

        Ok(Some(Account {
            name: host.clone(),
            email,
            imap: ImapConfig {
                host: host.clone(),
                port: self
                    .port
                    .unwrap_or_else(|| self.security.default_port()),
                security: self.security.into(),
                username: username.clone(),
                auth,
            },
            ..Default::default()
        }))
    }

    /// Applies timeout overrides to an account.
    pub const fn apply_timeouts(&self, account: &mut Account) {
        if let Some(secs) = self.connect_timeout {
            account.connect_timeout_secs = Some(secs);
        }
        if let Some(secs) = self.io_timeout {
            account.io_timeout_secs = Some(secs);
        }
    }
}

fn read_env(var: &str) -> Result<String> {
    std::env::var(var).with_context(|| format!("cannot read environment variable {var}"))
}
