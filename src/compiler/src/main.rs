use clap::Parser;

use lila::config::LilaArgs;
use lila::error::Result;
use lila::prelude::*;
use lila::{logging, pipeline};

use std::path::Path;
use std::process::ExitCode;

fn run_file(path: &Path, verbose: bool) -> Result<()> {
    let source = Input::File(path.to_owned()).read()?;
    let mut jit = JitSession::new()?;
    pipeline::run(&mut jit, &source, verbose)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = LilaArgs::parse();
    logging::init(&args.log_level);

    let result = match &args.input {
        Some(path) => run_file(path, args.verbose),
        None => Repl::new(ReplConfig::from(&args)).and_then(|mut repl| repl.run()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        },
    }
}
