//! Rentvault CLI entry point.

use clap::Parser;
use rentvault::cli::commands;
use rentvault::cli::{Cli, Commands};
use rentvault::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    // --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    match &cli.command {
        Commands::Init => commands::init::execute(cli, json),
        Commands::Info => commands::vault::info(cli, json),
        Commands::Destroy { yes } => commands::vault::destroy(cli, *yes, json),
        Commands::Version => commands::version::execute(json),

        Commands::Listing { command } => commands::listing::execute(command, cli, json),
        Commands::Document { command } => commands::document::execute(command, cli, json),
        Commands::Task { command } => commands::task::execute(command, cli, json),
        Commands::Profile { command } => commands::profile::execute(command, cli, json),
        Commands::Income { command } => commands::profile::execute_income(command, cli, json),
        Commands::Extra { command } => commands::profile::execute_extra(command, cli, json),

        Commands::Pdf(args) => commands::pdf::execute(args, cli, json),

        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
