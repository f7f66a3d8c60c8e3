use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use archmap::cli::{Cli, Commands};
use archmap::output::Printer;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "archmap=warn",
        1 => "archmap=debug",
        _ => "archmap=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Init(args) => archmap::cli::init::run(args, &printer)?,
        Commands::List(args) => archmap::cli::list::run(args, &printer)?,
        Commands::Validate(args) => archmap::cli::validate::run(args, &printer)?,
        Commands::Fmt(args) => archmap::cli::fmt::run(args, &printer)?,
        Commands::Resize(args) => archmap::cli::resize::run(args, &printer)?,
        Commands::Completions(args) => archmap::cli::completions::run(args)?,
    }

    Ok(())
}
