//! Append-only record of every node created in a working directory

use crate::error::{ProvisionError, Result};
use crate::node::NodeDescriptor;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One parsed ledger line: `<name> <ip> <lighthouse|node>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub name: String,
    pub ip: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Open the ledger at `path`, creating an empty file if there is none.
    /// Existing content is never truncated.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ProvisionError::fs("create", &path, e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, node: &NodeDescriptor) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| ProvisionError::fs("open", &self.path, e))?;
        writeln!(file, "{}", node.ledger_line())
            .map_err(|e| ProvisionError::fs("append", &self.path, e))
    }

    /// Entries in creation order; lines that do not have three fields are skipped
    pub fn entries(&self) -> Result<Vec<LedgerEntry>> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| ProvisionError::fs("read", &self.path, e))?;
        Ok(content.lines().filter_map(parse_line).collect())
    }
}

fn parse_line(line: &str) -> Option<LedgerEntry> {
    let mut fields = line.split_whitespace();
    let entry = LedgerEntry {
        name: fields.next()?.to_string(),
        ip: fields.next()?.to_string(),
        role: fields.next()?.to_string(),
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LighthouseEndpoint, Role};

    #[test]
    fn appends_in_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("node_info.txt")).unwrap();

        let alice = NodeDescriptor::new("alice", "10.0.0.2", Role::Lighthouse).unwrap();
        let endpoint = LighthouseEndpoint::new("10.0.0.2", "203.0.113.5").unwrap();
        let bob = NodeDescriptor::new("bob", "10.0.0.3", Role::Node(endpoint)).unwrap();
        ledger.append(&alice).unwrap();
        ledger.append(&bob).unwrap();

        let content = fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(content, "alice 10.0.0.2 lighthouse\nbob 10.0.0.3 node\n");

        let entries = ledger.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].role, "node");
    }

    #[test]
    fn reopening_keeps_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_info.txt");
        fs::write(&path, "old 10.0.0.9 node\n").unwrap();

        let ledger = Ledger::open(&path).unwrap();
        let carol = NodeDescriptor::new("carol", "10.0.0.4", Role::Lighthouse).unwrap();
        ledger.append(&carol).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "old 10.0.0.9 node\ncarol 10.0.0.4 lighthouse\n"
        );
    }

    #[test]
    fn blank_and_short_lines_are_ignored() {
        assert!(parse_line("").is_none());
        assert!(parse_line("alice 10.0.0.2").is_none());
        assert_eq!(parse_line("alice 10.0.0.2 lighthouse").unwrap().name, "alice");
    }
}
