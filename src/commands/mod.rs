// Command module routing
//
// Each operator action lives in its own file with a `handle_*` entry point.
// The interactive menu and the subcommands both end up in those handlers.

pub mod create_node;
pub mod init_ca;
pub mod nodes;

use crate::config::Settings;
use crate::prompt::Prompter;
use anyhow::Result;
use std::io::{BufRead, Write};

/// Top-level choice offered by the interactive menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InitializeAuthority,
    CreateNode,
}

impl Action {
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Action::InitializeAuthority),
            "2" => Some(Action::CreateNode),
            _ => None,
        }
    }
}

/// Ask which action to run, then run it.
///
/// Anything but `1` or `2` is reported and returns `Ok` without touching the
/// working directory.
pub fn handle_menu<R: BufRead, W: Write>(
    settings: Settings,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    let choice =
        prompter.ask("Select an action: 1) Initialize CA  2) Create node (enter 1 or 2)")?;

    match Action::from_choice(&choice) {
        Some(Action::InitializeAuthority) => init_ca::handle_init_ca(settings, None, prompter),
        Some(Action::CreateNode) => create_node::handle_create_node(
            settings,
            create_node::CreateNodeArgs::default(),
            prompter,
        )
        .map(|_| ()),
        None => {
            prompter.say(&format!("Invalid action: '{}'", choice))?;
            Ok(())
        }
    }
}
