use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as CParser;
use log::{debug, warn, LevelFilter};
use trylang::Config;

#[derive(CParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Source file to run.
    file: PathBuf,

    /// Parse the program and print its structure instead of running it.
    #[arg(long)]
    display_ast: bool,

    /// Path to a `trylang.toml` config file overriding the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    simple_logger::init_with_level(level.to_level().unwrap_or(log::Level::Warn))
        .expect("logger already initialized");

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Could not read file '{}': {e}", args.file.display());
            return ExitCode::FAILURE;
        }
    };

    let config = match &args.config {
        Some(path) => match Config::load_from_path(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!("config file present but unreadable, falling back to defaults: {e}");
                Config::default()
            }
        },
    };

    debug!("lexing {}", args.file.display());
    let parsed: Result<trylang::ast::Program, trylang::Error> =
        trylang::parser::Parser::new(&source)
            .map_err(trylang::Error::from)
            .and_then(|mut p| p.get_program().map_err(trylang::Error::from));
    debug!("parsing complete for {}", args.file.display());

    if args.display_ast {
        warn!("--display-ast given, skipping evaluation of {}", args.file.display());
        return match parsed {
            Ok(program) => {
                println!("{program:#?}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let program = match parsed {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    debug!("evaluation starting for {}", args.file.display());
    let stdin = BufReader::new(io::stdin());
    match trylang::run_program(program, &config, stdin, io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
