//! Interactive read-eval-print loop.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use tracing::{debug, warn};

use crate::config::ReplConfig;
use crate::error::Result;
use crate::jit::JitSession;
use crate::pipeline;

pub const HELP: &str = "\
:help     show this text
:silent   stop echoing tokens, ast and ir
:verbose  echo tokens, ast and ir of every line
:quit     leave the repl";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Silent,
    Verbose,
    Quit,
}

impl Command {
    /// Commands only match as the whole line.
    pub fn parse(line: &str) -> Option<Self> {
        match line {
            ":help" => Some(Command::Help),
            ":silent" => Some(Command::Silent),
            ":verbose" => Some(Command::Verbose),
            ":quit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// What handling a line amounted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Blank,
    Command(Command),
    Evaluated(f64),
}

pub struct Repl {
    jit: JitSession,
    config: ReplConfig,
}

impl Repl {
    pub fn new(config: ReplConfig) -> Result<Self> {
        Ok(Self {
            jit: JitSession::new()?,
            config,
        })
    }

    pub fn is_verbose(&self) -> bool {
        self.config.verbose
    }

    /// Number of units currently loaded, zero between lines.
    pub fn loaded_units(&self) -> usize {
        self.jit.len()
    }

    /// Handles one line of input. Errors leave the session as it was.
    pub fn eval_line(&mut self, line: &str) -> Result<Step> {
        if let Some(command) = Command::parse(line) {
            match command {
                Command::Help => println!("{}", HELP),
                Command::Silent => self.config.verbose = false,
                Command::Verbose => self.config.verbose = true,
                Command::Quit => {},
            }
            return Ok(Step::Command(command));
        }

        if line.trim().is_empty() {
            return Ok(Step::Blank);
        }

        pipeline::run(&mut self.jit, line, self.config.verbose).map(Step::Evaluated)
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        if let Some(path) = &self.config.history {
            if let Err(err) = editor.load_history(path) {
                debug!(path = %path.display(), %err, "no history loaded");
            }
        }

        println!("welcome to lila {}", env!("CARGO_PKG_VERSION"));
        println!("type in expressions to have them evaluated");
        println!("type :help for more information");

        loop {
            match editor.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }

                    match self.eval_line(&line) {
                        Ok(Step::Command(Command::Quit)) => break,
                        Ok(_) => {},
                        Err(err) => eprintln!("{}", err),
                    }
                },
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!(":quit");
                    break;
                },
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(path) = &self.config.history {
            if let Err(err) = editor.save_history(path) {
                warn!(path = %path.display(), %err, "could not save history");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_match_whole_lines_only() {
        assert_eq!(Command::parse(":help"), Some(Command::Help));
        assert_eq!(Command::parse(":quit"), Some(Command::Quit));
        assert_eq!(Command::parse(":verbose"), Some(Command::Verbose));
        assert_eq!(Command::parse(":silent"), Some(Command::Silent));

        assert_eq!(Command::parse(" :quit"), None);
        assert_eq!(Command::parse(":quit now"), None);
        assert_eq!(Command::parse("quit"), None);
    }

    #[test]
    fn verbosity_toggles() {
        let mut repl = Repl::new(ReplConfig::default()).unwrap();
        assert!(!repl.is_verbose());

        assert_eq!(repl.eval_line(":verbose").unwrap(), Step::Command(Command::Verbose));
        assert!(repl.is_verbose());

        assert_eq!(repl.eval_line(":silent").unwrap(), Step::Command(Command::Silent));
        assert!(!repl.is_verbose());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut repl = Repl::new(ReplConfig::default()).unwrap();
        assert_eq!(repl.eval_line("").unwrap(), Step::Blank);
        assert_eq!(repl.eval_line("   ").unwrap(), Step::Blank);
    }
}
