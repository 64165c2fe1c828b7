//! Dungeon compiler CLI
//!
//! Front-end driver: run the parser over a module for lint-style error
//! reporting or dump the classified sentence stream.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{generate, Shell};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use dunc::{Parser, ParserConfig};

#[derive(ClapParser)]
#[command(name = "dunc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dungeon compiler front-end", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a module and report diagnostics
    Lint {
        /// Input .dun source file, or - for standard input
        input: PathBuf,

        /// Path to a dungeon.toml with a [parser] table
        #[arg(long)]
        config: Option<PathBuf>,

        /// Known type identifiers, comma separated
        #[arg(long, default_value = "")]
        types: String,

        /// Stop after this many errors
        #[arg(long, default_value_t = 10)]
        max_errors: usize,
    },

    /// Dump the classified sentence stream with code labels
    Sentences {
        /// Input .dun source file, or - for standard input
        input: PathBuf,

        /// Path to a dungeon.toml with a [parser] table
        #[arg(long)]
        config: Option<PathBuf>,

        /// Known type identifiers, comma separated
        #[arg(long, default_value = "")]
        types: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Lint {
            input,
            config,
            types,
            max_errors,
        } => {
            run_lint(&input, config.as_deref(), &types, max_errors);
        }
        Commands::Sentences {
            input,
            config,
            types,
        } => {
            run_sentences(&input, config.as_deref(), &types);
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "dunc", &mut io::stdout());
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> ParserConfig {
    let Some(path) = path else {
        return ParserConfig::default();
    };
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading config {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    match ParserConfig::from_toml(&content) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn open_parser(input: &std::path::Path, config: ParserConfig, types: &str) -> Parser {
    let result = if input.as_os_str() == "-" {
        Parser::from_stdin("<stdin>", config)
    } else {
        Parser::open(&input.to_string_lossy(), config)
    };
    match result {
        Ok(mut parser) => {
            if !types.is_empty() {
                parser.set_type_ids(types);
            }
            parser
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_lint(input: &std::path::Path, config: Option<&std::path::Path>, types: &str, max_errors: usize) {
    let mut parser = open_parser(input, load_config(config), types);
    if parser.library_option_found() {
        println!("note: module sets library=true");
    }

    let mut sentences = 0usize;
    let mut errors = 0usize;
    loop {
        match parser.next_sentence() {
            Ok(Some(_)) => sentences += 1,
            Ok(None) => break,
            Err(e) => {
                eprintln!("{}", e);
                if !parser.current_line().is_empty() {
                    eprintln!("    {}", parser.current_line());
                }
                errors += 1;
                if errors >= max_errors {
                    eprintln!("Too many errors, giving up");
                    break;
                }
                // Roll back the half-applied sentence and keep going
                parser.state_back();
            }
        }
    }

    println!("{} sentences, {} errors", sentences, errors);
    if errors > 0 {
        process::exit(1);
    }
}

fn run_sentences(input: &std::path::Path, config: Option<&std::path::Path>, types: &str) {
    let mut parser = open_parser(input, load_config(config), types);
    loop {
        match parser.next_sentence() {
            Ok(Some(sentence)) => {
                println!(
                    "{:5}  {:016x}  {}",
                    sentence.line_nr(),
                    sentence.code_block_id(),
                    sentence.print()
                );
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
}
