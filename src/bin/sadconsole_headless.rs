//! SadConsole Headless Runner
//!
//! Prints text (with inline color markup) through the root console's cursor
//! and outputs a snapshot of the resulting surface.
//!
//! # Usage
//!
//! ```bash
//! # Print markup from stdin and output text
//! echo "[c:r f:red]Hello[c:u] world" | sadconsole-headless
//!
//! # Read a file and output a JSON snapshot
//! sadconsole-headless --file input.txt --json --cols 40 --rows 10
//! ```

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use sadconsole::app::{Engine, EngineConfig};
use sadconsole::core::Snapshot;
use sadconsole::scene::TextRenderer;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Frame,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut cols: Option<usize> = None;
    let mut rows: Option<usize> = None;
    let mut input_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut output_format = OutputFormat::Text;
    let mut plain = false;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if i < args.len() {
                    cols = args[i].parse().ok();
                }
            },
            "-r" | "--rows" => {
                i += 1;
                if i < args.len() {
                    rows = args[i].parse().ok();
                }
            },
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(PathBuf::from(&args[i]));
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(PathBuf::from(&args[i]));
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "--frame" => {
                output_format = OutputFormat::Frame;
            },
            "--plain" => {
                plain = true;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            other => {
                eprintln!("Unknown argument: {}", other);
                show_help = true;
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &config_file {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => EngineConfig::load_or_default(),
    };
    if let Some(cols) = cols {
        config.width = cols;
    }
    if let Some(rows) = rows {
        config.height = rows;
    }
    if plain {
        config.cursor.use_string_parser = false;
    }

    let input = match &input_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => {
            let mut data = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    let mut engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error starting engine: {}", e);
            return ExitCode::FAILURE;
        },
    };
    tracing::info!(chars = input.chars().count(), "printing input");

    let parser = engine.parser().clone();
    if let Some(console) = engine.root_console_mut() {
        console
            .cursor_writer()
            .print_with_parser(&parser, input.trim_end_matches(['\r', '\n']));
    }

    let mut renderer = TextRenderer::new();
    engine.tick(0.0, &mut renderer);

    let output = match output_format {
        OutputFormat::Frame => format!("{}\n", renderer.output()),
        OutputFormat::Text | OutputFormat::Json => {
            let Some(console) = engine.root_console() else {
                eprintln!("Root console missing");
                return ExitCode::FAILURE;
            };
            let snapshot = Snapshot::from_surface(console.surface(), Some(&console.cursor));
            if output_format == OutputFormat::Text {
                snapshot.to_text()
            } else {
                match snapshot.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        eprintln!("Error serializing snapshot: {}", e);
                        return ExitCode::FAILURE;
                    },
                }
            }
        },
    };

    if let Err(e) = io::stdout().write_all(output.as_bytes()) {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn print_help() {
    println!(
        r#"sadconsole-headless - Print markup text onto a console and dump it

USAGE:
    sadconsole-headless [OPTIONS]

OPTIONS:
    -c, --cols <N>       Console width in cells (default: from config, 80)
    -r, --rows <N>       Console height in cells (default: from config, 25)
    -f, --file <FILE>    Read text from file instead of stdin
        --config <FILE>  Engine config JSON (default: ~/.config/sadconsole/config.json)
    -t, --text           Output snapshot as plain text (default)
    -j, --json           Output snapshot as JSON
        --frame          Output the rendered frame, caret included
        --plain          Print text as-is, without markup commands
    -h, --help           Show this help message

EXAMPLES:
    # Colored greeting
    echo "[c:r f:red]Hello[c:u] world" | sadconsole-headless --json

    # Word wrap in a narrow console
    sadconsole-headless -c 20 -r 5 -f story.txt
"#
    );
}
