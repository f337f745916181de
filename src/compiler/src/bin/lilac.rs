use clap::Parser;

use lila::config::{CompileConfig, LilacArgs};
use lila::error::LilaError;
use lila::{logging, pipeline};

use std::process::ExitCode;

fn main() -> ExitCode {
    let args = LilacArgs::parse();
    logging::init(&args.log_level);

    let config = CompileConfig::from(&args);
    let result = config
        .input
        .read()
        .map_err(LilaError::from)
        .and_then(|source| pipeline::emit(&source, &config.output, config.verbose));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        },
    }
}
