//! Ledger listing command handler

use crate::config::Settings;
use crate::ledger::Ledger;
use anyhow::Result;

/// Print every node recorded in the ledger, oldest first
pub fn handle_nodes(settings: &Settings) -> Result<()> {
    if !settings.ledger.exists() {
        println!("No nodes created yet ({} not found)", settings.ledger.display());
        return Ok(());
    }

    let entries = Ledger::open(&settings.ledger)?.entries()?;
    if entries.is_empty() {
        println!("No nodes created yet");
        return Ok(());
    }

    println!("{:<24} {:<20} ROLE", "NAME", "IP");
    for entry in entries {
        println!("{:<24} {:<20} {}", entry.name, entry.ip, entry.role);
    }
    Ok(())
}
