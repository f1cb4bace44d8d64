//! Provisioning for Nebula mesh overlays.
//!
//! Creates a certificate authority with `nebula-cert`, then turns each new
//! node into a self-contained directory: signed host certificate, CA
//! certificate, daemon binaries, a `config.yml` derived from a shared
//! template, and launcher scripts.

pub mod cert_tool;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod launcher;
pub mod ledger;
pub mod node;
pub mod overlay_config;
pub mod platform;
pub mod prompt;
pub mod provisioner;
pub mod staging;

pub use config::Settings;
pub use error::{ProvisionError, Result};
pub use node::{LighthouseEndpoint, NodeDescriptor, Role};
pub use provisioner::{NodeReport, Provisioner};
