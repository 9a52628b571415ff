//! ---
//! pas_section: "05-networking-external-interfaces"
//! pas_subsection: "binary"
//! pas_type: "source"
//! pas_scope: "code"
//! pas_description: "Control CLI for administrators interacting with W-PAS."
//! pas_version: "v0.0.0-prealpha"
//! pas_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};
use w_pas_common::version::VersionInfo;

mod catalog;
mod check;
mod validate;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    arg_required_else_help = true,
    about = "W-PAS administrative control utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Evaluate one role/key decision against a permission map")]
    Check(check::CheckArgs),
    #[command(about = "Validate an override blob file against the catalogue")]
    Validate(validate::ValidateArgs),
    #[command(about = "Print the effective category catalogue")]
    Catalog(catalog::CatalogArgs),
}

fn init_logging() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }
    let Some(command) = cli.command else {
        anyhow::bail!("a subcommand is required; run with --help for usage");
    };
    let code = match command {
        Commands::Check(args) => check::run(args)?,
        Commands::Validate(args) => validate::run(args)?,
        Commands::Catalog(args) => catalog::run(args)?,
    };
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
