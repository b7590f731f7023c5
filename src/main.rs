//! Thin driver around the library's `Session` entry point: reads a file or
//! prompt line, hands the text to `execute`, and displays diagnostics.  All
//! language behavior lives in the library.

use std::fs::File;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::info;

use larch::error::ErrorKind;
use larch::run::Session;
use larch::scanner;

#[derive(ClapParser, Debug)]
#[command(version, about = "Larch language interpreter", long_about = None)]
pub struct Cli {
    /// With no subcommand, starts an interactive prompt.
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable logging to larch.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scans a file and prints each token
    Tokenize {
        filename: PathBuf,

        /// Emit tokens as JSON, one object per line
        #[arg(long)]
        json: bool,
    },

    /// Runs a file as a Larch program
    Run { filename: PathBuf },
}

fn init_logger(to_file: bool) -> Result<()> {
    if !to_file {
        Builder::new().filter_level(log::LevelFilter::Off).init();

        return Ok(());
    }

    let log_file = File::create("larch.log").context("Failed to create larch.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .and_then(|p| p.strip_prefix("larch::"))
                .or(record.module_path())
                .unwrap_or("<unnamed>");

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to larch.log");

    Ok(())
}

fn read_source(filename: &PathBuf) -> Result<String> {
    std::fs::read_to_string(filename).context(format!("Failed to read file {:?}", filename))
}

/// Exit code per diagnostic class: 65 for static errors, 70 for runtime ones.
fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Lexical | ErrorKind::Syntax | ErrorKind::Resolution => 65,
        _ => 70,
    }
}

fn tokenize(filename: PathBuf, json: bool) -> Result<()> {
    let source = read_source(&filename)?;

    for token in scanner::Scanner::new(&source) {
        match token {
            Ok(token) if json => println!("{}", serde_json::to_string(&token)?),
            Ok(token) => println!("{}", token),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(65);
            }
        }
    }

    Ok(())
}

fn run_file(filename: PathBuf) -> Result<()> {
    let source = read_source(&filename)?;

    let mut session = Session::new();

    if let Err(e) = session.execute(&source) {
        eprintln!("{}", e);
        std::process::exit(exit_code(e.kind()));
    }

    Ok(())
}

/// Interactive prompt.  One session serves the whole loop, so state defined
/// on earlier lines stays visible; a diagnostic only aborts its own line.
fn run_prompt() -> Result<()> {
    let mut session = Session::new();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        match session.execute(&line) {
            Ok(values) => {
                for value in values {
                    println!("{}", value);
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    init_logger(args.log)?;

    info!("CLI arguments: {:?}", args);

    match args.command {
        Some(Command::Tokenize { filename, json }) => tokenize(filename, json),
        Some(Command::Run { filename }) => run_file(filename),
        None => run_prompt(),
    }
}
