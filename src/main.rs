use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use lox_rs as lox;

use lox::ast_printer::AstPrinter;
use lox::error::LoxError;
use lox::expr::ExprId;
use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner;
use lox::stmt::Stmt;
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Dump the token stream as JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints the AST of each statement
    Parse { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program, or starts a REPL
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'lox_rs::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("lox_rs::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report_all(errors: &[LoxError]) {
    for error in errors {
        eprintln!("{}", error);
    }
}

/// Scan and parse a buffer; on any static error, report and exit 65.
fn front_end(buf: &[u8]) -> (Vec<Stmt>, ExprId) {
    let (tokens, errors): (Vec<Token>, Vec<LoxError>) = scanner::scan(buf);

    if !errors.is_empty() {
        report_all(&errors);
        std::process::exit(65);
    }

    let mut parser = Parser::new(tokens);
    let (statements, errors) = parser.parse();

    if !errors.is_empty() {
        report_all(&errors);
        std::process::exit(65);
    }

    (statements, parser.next_id())
}

fn run_file(filename: PathBuf) -> Result<()> {
    let buf = read_file(filename)?;
    let (statements, _) = front_end(&buf);

    info!("Parsed {} statements", statements.len());

    let mut interpreter = Interpreter::new();

    let errors = Resolver::new(&mut interpreter).resolve(&statements);
    if !errors.is_empty() {
        report_all(&errors);
        std::process::exit(65);
    }

    if let Err(e) = interpreter.interpret(&statements) {
        debug!("Runtime debug: {}", e);
        eprintln!("{}", e);
        std::process::exit(70);
    }

    info!("Program executed successfully");
    Ok(())
}

/// Line-at-a-time REPL sharing one interpreter across inputs.
///
/// The parser's node-id counter is threaded from line to line: a fresh
/// counter would reuse ids already recorded in the interpreter's
/// resolution table by earlier lines (which live closures still depend on).
fn repl() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let mut next_id: ExprId = 0;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        if line.trim().is_empty() {
            continue;
        }

        let (tokens, errors) = scanner::scan(line.as_bytes());
        if !errors.is_empty() {
            report_all(&errors);
            continue;
        }

        let mut parser = Parser::with_starting_id(tokens, next_id);
        let (statements, errors) = parser.parse();
        next_id = parser.next_id();

        if !errors.is_empty() {
            report_all(&errors);
            continue;
        }

        let errors = Resolver::new(&mut interpreter).resolve(&statements);
        if !errors.is_empty() {
            report_all(&errors);
            continue;
        }

        if let Err(e) = interpreter.interpret(&statements) {
            eprintln!("{}", e);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let buf = read_file(filename)?;
                let (tokens, errors) = scanner::scan(&buf);

                report_all(&errors);

                if json {
                    let dump = serde_json::to_string_pretty(&tokens)
                        .context("Failed to serialize tokens")?;
                    println!("{}", dump);
                } else {
                    for token in &tokens {
                        debug!("Scanned token: {}", token);
                        println!("{}", token);
                    }
                }

                if !errors.is_empty() {
                    debug!("Tokenization failed, exiting with code 65");
                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let buf = read_file(filename)?;
                let (statements, _) = front_end(&buf);

                let printer = AstPrinter;
                for statement in &statements {
                    let ast_str = printer.print_stmt(statement);

                    debug!("AST: {}", ast_str);
                    println!("{}", ast_str);
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                run_file(filename)?;
            }
            None => {
                info!("No filepath provided for Run, starting REPL");
                repl()?;
            }
        },
    }

    Ok(())
}
