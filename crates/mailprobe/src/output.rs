//! Printing check reports and account lists.

use mailprobe_core::{Account, CheckReport};
use serde_json::json;

/// Prints a check report as text or JSON.
pub fn print_report(report: &CheckReport, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let status = if report.is_ok() { "OK" } else { "FAILED" };
    println!(
        "{status}: {} ({}:{}, {})",
        report.account,
        report.host,
        report.port,
        report.security.display_name()
    );
    println!("  result:  {}", report.message);
    println!("  server:  {}", report.server);
    if let Some(response) = &report.login_response {
        println!("  reply:   {response}");
    }
    if let Some(hint) = &report.hint {
        println!("  hint:    {hint}");
    }
    println!("  time:    {} ms", report.elapsed_ms);
    Ok(())
}

/// Prints configured accounts, without their secrets.
pub fn print_accounts(accounts: &[Account], as_json: bool) -> anyhow::Result<()> {
    if as_json {
        let list: Vec<_> = accounts
            .iter()
            .map(|a| {
                json!({
                    "name": a.name,
                    "email": a.email,
                    "host": a.imap.host,
                    "port": a.imap.port,
                    "security": a.imap.security,
                    "default": a.is_default,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("no accounts configured");
    }
    for account in accounts {
        let marker = if account.is_default { "*" } else { " " };
        println!(
            "{marker} {:<16} {:<32} {}:{} ({})",
            account.name,
            account.email,
            account.imap.host,
            account.imap.port,
            account.imap.security.display_name()
        );
    }
    Ok(())
}
