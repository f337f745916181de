//! Command line options of the `lila` and `lilac` binaries.

use clap::Parser;

use std::fs::File;
use std::io::{self, prelude::*, BufReader};
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = "lila> ";
pub const DEFAULT_OUTPUT: &str = "a.out.bc";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "lila", version, about = "Interactive lila compiler")]
pub struct LilaArgs {
    /// Run this file once instead of starting the REPL
    pub input: Option<PathBuf>,

    /// Echo tokens, AST and IR of every input
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// File to load and save the REPL history from
    #[arg(long, env = "LILA_HISTORY")]
    pub history: Option<PathBuf>,

    /// Default log filter, overridden by LILA_LOG
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

#[derive(Debug, Parser)]
#[command(name = "lilac", version, about = "Compiles a lila program to LLVM bitcode")]
pub struct LilacArgs {
    /// Source file, or "-" for standard input
    #[arg(default_value = "-")]
    pub input: String,

    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Echo tokens, AST and IR of the input
    #[arg(short, long)]
    pub verbose: bool,

    /// Default log filter, overridden by LILA_LOG
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReplConfig {
    pub verbose: bool,
    pub prompt: String,
    pub history: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            prompt: DEFAULT_PROMPT.to_owned(),
            history: None,
        }
    }
}

impl From<&LilaArgs> for ReplConfig {
    fn from(args: &LilaArgs) -> Self {
        Self {
            verbose: args.verbose,
            prompt: args.prompt.clone(),
            history: args.history.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn read(&self) -> io::Result<String> {
        let mut contents = String::new();
        match self {
            Input::Stdin => {
                io::stdin().lock().read_to_string(&mut contents)?;
            },
            Input::File(path) => {
                let mut buf_reader = BufReader::new(File::open(path)?);
                buf_reader.read_to_string(&mut contents)?;
            },
        }
        Ok(contents)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompileConfig {
    pub input: Input,
    pub output: PathBuf,
    pub verbose: bool,
}

impl From<&LilacArgs> for CompileConfig {
    fn from(args: &LilacArgs) -> Self {
        let input = match args.input.as_str() {
            "-" => Input::Stdin,
            path => Input::File(PathBuf::from(path)),
        };

        Self {
            input,
            output: args.output.clone(),
            verbose: args.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lila_defaults() {
        let args = LilaArgs::try_parse_from(["lila"]).unwrap();
        assert!(args.input.is_none());
        assert_eq!(args.log_level, DEFAULT_LOG_LEVEL);

        let config = ReplConfig::from(&args);
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert!(!config.verbose);
    }

    #[test]
    fn lila_options() {
        let args = LilaArgs::try_parse_from(["lila", "-v", "--prompt", "> ", "prog.li"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("prog.li")));

        let config = ReplConfig::from(&args);
        assert!(config.verbose);
        assert_eq!(config.prompt, "> ");
    }

    #[test]
    fn lilac_reads_stdin_by_default() {
        let args = LilacArgs::try_parse_from(["lilac"]).unwrap();
        let config = CompileConfig::from(&args);
        assert_eq!(config.input, Input::Stdin);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
    }

    #[test]
    fn lilac_options() {
        let args = LilacArgs::try_parse_from(["lilac", "-o", "out.bc", "-v", "prog.li"]).unwrap();
        let config = CompileConfig::from(&args);
        assert_eq!(config.input, Input::File(PathBuf::from("prog.li")));
        assert_eq!(config.output, PathBuf::from("out.bc"));
        assert!(config.verbose);
    }

    #[test]
    fn reads_source_files() {
        let path = std::env::temp_dir().join(format!("lila-input-{}.li", std::process::id()));
        std::fs::write(&path, "val x = 10\nx * 2\n").unwrap();

        let source = Input::File(path.clone()).read();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(source.unwrap(), "val x = 10\nx * 2\n");

        assert!(Input::File(path).read().is_err());
    }
}
