//! Entry point for the `sahayog` command-line interface.
#![forbid(unsafe_code)]

use sahayog_cli::CliError;

fn main() {
    sahayog_cli::init_logging();
    match sahayog_cli::run() {
        Ok(()) => {}
        // Help, version and usage errors keep clap's own formatting and exit codes.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("sahayog: {err}");
            std::process::exit(1);
        }
    }
}
