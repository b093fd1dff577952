//! vtemu Headless Runner
//!
//! Feeds captured terminal output through the emulator and prints the
//! resulting screen. Reads input from stdin or a file.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use vtemu::{Terminal, TerminalConfig};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut cols: Option<usize> = None;
    let mut rows: Option<usize> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut input_file: Option<String> = None;
    let mut chunk_size: usize = 0;
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                cols = args.get(i).and_then(|v| v.parse().ok());
            },
            "-r" | "--rows" => {
                i += 1;
                rows = args.get(i).and_then(|v| v.parse().ok());
            },
            "--config" => {
                i += 1;
                config_file = args.get(i).map(PathBuf::from);
            },
            "--chunk" => {
                i += 1;
                chunk_size = args.get(i).and_then(|v| v.parse().ok()).unwrap_or(0);
            },
            "-f" | "--file" => {
                i += 1;
                input_file = args.get(i).cloned();
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            arg => {
                // Treat as input file if no flag
                if input_file.is_none() && !arg.starts_with('-') {
                    input_file = Some(arg.to_string());
                } else {
                    eprintln!("Unknown argument: {}", arg);
                    return ExitCode::FAILURE;
                }
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    // Build the configuration: file first, then command line overrides
    let mut config = match &config_file {
        Some(path) => match TerminalConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => TerminalConfig::default(),
    };
    if let Some(cols) = cols {
        config.cols = cols;
    }
    if let Some(rows) = rows {
        config.rows = rows;
    }

    let mut terminal = match Terminal::with_config(&config) {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        },
    };

    // Read input
    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            // Read from stdin
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    // Process input, optionally in fixed-size chunks to exercise
    // sequences split across reads
    let mut bells = 0;
    if chunk_size == 0 {
        bells += terminal.feed_bytes(&input_data).bells;
    } else {
        for chunk in input_data.chunks(chunk_size) {
            bells += terminal.feed_bytes(chunk).bells;
        }
    }
    tracing::debug!(bytes = input_data.len(), bells, "input processed");

    // Output result
    match output_format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", terminal.cols(), terminal.rows());
            println!("Cursor: ({}, {})", terminal.cursor_y(), terminal.cursor_x());
            println!("Scrollback: {} lines", terminal.scrollback().len());
            println!("---");
            print!("{}", terminal.snapshot().to_text());
            println!("---");
        },
        OutputFormat::Json => match terminal.snapshot().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            },
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("vtemu Headless Runner");
    println!();
    println!("Usage: vtemu-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default: 80)");
    println!("  -r, --rows <N>       Set terminal height (default: 24)");
    println!("      --config <PATH>  Load a JSON terminal configuration");
    println!("      --chunk <N>      Feed input in chunks of N bytes");
    println!("  -f, --file <PATH>    Read input from file");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!("Set RUST_LOG=debug to log ignored sequences to stderr.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello\\033[31mWorld\\033[0m' | vtemu-headless");
    println!("  vtemu-headless -c 120 -r 40 input.txt");
    println!("  vtemu-headless --json --chunk 7 < capture.bin > snapshot.json");
}
