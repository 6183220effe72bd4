use std::io::Read;
use std::process::ExitCode;

use batch_parser::{parse_with_options, render_document, ParserOptions};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "batch-parser")]
#[command(about = "Parse a Windows batch script and print its syntax tree")]
#[command(version)]
struct Cli {
    /// Parse the script from command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Output the tree as JSON
    #[arg(long = "json")]
    json: bool,

    /// Maximum nesting of IF / FOR bodies
    #[arg(long = "max-depth")]
    max_depth: Option<usize>,

    /// Maximum script size in bytes
    #[arg(long = "max-input-size")]
    max_input_size: Option<usize>,

    /// Script file to parse
    #[arg()]
    script_file: Option<String>,
}

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG, warnings only by default)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    // Determine script source: -c, file, or stdin
    let script = if let Some(s) = cli.script {
        s
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: Cannot read script file: {}: {}", file, e);
                return ExitCode::from(2);
            }
        }
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!("Error: No script provided. Use -c 'script', provide a script file, or pipe via stdin.");
            return ExitCode::from(2);
        }
        let mut buf = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
            eprintln!("Error: Cannot read stdin: {}", e);
            return ExitCode::from(2);
        }
        buf
    };

    let defaults = ParserOptions::default();
    let options = ParserOptions {
        max_input_size: cli.max_input_size.unwrap_or(defaults.max_input_size),
        max_depth: cli.max_depth.unwrap_or(defaults.max_depth),
    };

    let document = match parse_with_options(&script, options) {
        Ok(document) => document,
        Err(e) => {
            if cli.json {
                eprintln!("{}", serde_json::json!({ "error": e }));
            } else {
                eprintln!("{}", e);
            }
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&document) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: Cannot serialize tree: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render_document(&document, 0));
    }

    ExitCode::SUCCESS
}
