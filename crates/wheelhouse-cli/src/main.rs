//! wheelhouse - install Python wheels

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wheelhouse_cli::cmd;
use wheelhouse_cli::cmd::install::InstallArgs;
use wheelhouse_cli::ui::Output;
use wheelhouse_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    let out = Output::new(cli.quiet);

    match cli.command {
        Commands::Install {
            wheel,
            prefix,
            destdir,
            python_version,
            interpreter,
            schemes,
            validate_record,
            overwrite,
            json,
        } => cmd::install::install(
            InstallArgs {
                wheel,
                prefix,
                destdir,
                python_version,
                interpreter,
                schemes,
                validate_record,
                overwrite,
                json,
            },
            cli.dry_run,
            out,
        ),
        Commands::Verify { wheel, mode } => cmd::verify::verify(&wheel, mode, out),
    }
}
