//! Certificate authority command handler

use crate::config::Settings;
use crate::prompt::Prompter;
use crate::provisioner::{DEFAULT_CA_NAME, Provisioner};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Handle CA initialization. Prompts for the name when `name` is `None`.
pub fn handle_init_ca<R: BufRead, W: Write>(
    settings: Settings,
    name: Option<String>,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => prompter.ask_or("Enter CA name", DEFAULT_CA_NAME)?,
    };

    let provisioner = Provisioner::new(settings)?;
    provisioner
        .initialize_authority(&name)
        .context("Failed to initialize certificate authority")?;
    Ok(())
}
