use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nebula_provision::commands::{self, create_node::CreateNodeArgs};
use nebula_provision::config::{Settings, SettingsOverrides};
use nebula_provision::prompt::Prompter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nebula-provision")]
#[command(about = "Nebula mesh provisioning - create a CA and per-node bundles", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding ca.crt/ca.key, config.yml, nebula releases and nodes/
    #[arg(long, short = 'C', default_value = ".")]
    work_dir: PathBuf,
    /// Settings file (default: provision.toml if present). Relative paths
    /// here and below resolve against --work-dir
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path to nebula-cert
    #[arg(long)]
    cert_tool: Option<PathBuf>,
    /// Config template every node config is derived from
    #[arg(long)]
    template: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Enable debug logging
    #[arg(long)]
    debug: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the certificate authority (ca.crt / ca.key)
    InitCa {
        /// CA name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign a node certificate and build its directory under nodes/
    CreateNode(CreateNodeArgs),
    /// List nodes recorded in the ledger
    Nodes,
}

fn init_logging(cli: &Cli) {
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let work_dir = cli.work_dir.canonicalize().with_context(|| {
        format!("Working directory not found: {}", cli.work_dir.display())
    })?;
    dotenv::from_path(work_dir.join(".env")).ok();

    let overrides = SettingsOverrides {
        cert_tool: cli.cert_tool.clone(),
        template: cli.template.clone(),
    };
    let settings = Settings::load(&work_dir, cli.config.as_deref(), &overrides)?;
    let mut prompter = Prompter::stdio();

    match cli.command {
        None => commands::handle_menu(settings, &mut prompter)?,
        Some(Commands::InitCa { name }) => {
            commands::init_ca::handle_init_ca(settings, name, &mut prompter)?
        }
        Some(Commands::CreateNode(args)) => {
            commands::create_node::handle_create_node(settings, args, &mut prompter)?;
        }
        Some(Commands::Nodes) => commands::nodes::handle_nodes(&settings)?,
    }

    Ok(())
}
