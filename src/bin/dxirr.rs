use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use dxirr_lib::check::{check, Check};
use dxirr_lib::completions::{setup_shell_completions, SetupShellCompletions};
use dxirr_lib::network::{network, Network};
use dxirr_lib::{exit_code_for, IRRError};
use env_logger::Builder;
use log::LevelFilter;
use std::process;

#[derive(Parser)]
#[command(author, about, long_about = None)]
#[command(name = "dxirr")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug messages. Use -vv for more verbose messages.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check ESXi host and Delphix VM settings against the recommended values.
    Check(Check),

    /// Run network latency and throughput tests from a Delphix Engine.
    Network(Network),

    /// Generate shell completion scripts.
    SetupShellCompletions(SetupShellCompletions),
}

fn init_logger(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        2 => LevelFilter::Trace,
        _ => return Err(IRRError::InvalidVerboseOption.into()),
    };
    Builder::new().filter_level(level).init();
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    init_logger(cli.verbose)?;

    match &cli.command {
        Commands::Check(c) => check(c),
        Commands::Network(n) => network(n),
        Commands::SetupShellCompletions(s) => setup_shell_completions(s, &mut Cli::command()),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        process::exit(exit_code_for(&err));
    }
}
