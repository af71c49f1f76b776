//! qmkctx CLI entry point.

use clap::Parser;

use qmkctx::cli::Cli;
use qmkctx::infrastructure::logging::LoggerImpl;

fn main() {
    let cli = Cli::parse();

    let _logger = match LoggerImpl::init(&cli.log_config()) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    if let Err(err) = qmkctx::cli::run(&cli) {
        qmkctx::cli::handle_error(err, cli.json);
    }
}
