use std::process;

use clap::Parser;
use log::error;
use templated_mailer::{logging::init_logging, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _handle = init_logging(cli.log_level.into())?;
    if let Err(e) = run(cli) {
        // Logged once here so it also reaches the log file
        error!("{e:#}");
        process::exit(1);
    }
    Ok(())
}
