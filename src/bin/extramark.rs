//! Command-line front end for extramark.
//!
//! Reads Markdown Extra from a file or stdin and writes HTML to stdout or a
//! file. Feature selection goes through a named preset or a JSON/YAML
//! feature file; everything else is the engine's defaults.
//!
//! Usage:
//!   extramark [path] [--preset name] [--features file] [--output file]

use std::io::Read;
use std::path::PathBuf;

use clap::{Arg, Command};

use extramark::{presets, Engine, Features, Options};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("extramark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert Markdown Extra text to HTML")
        .arg(
            Arg::new("path")
                .help("Input file; stdin when omitted")
                .index(1),
        )
        .arg(
            Arg::new("preset")
                .long("preset")
                .short('p')
                .help("Feature preset: full, light or minimal")
                .default_value("full"),
        )
        .arg(
            Arg::new("features")
                .long("features")
                .short('f')
                .help("JSON or YAML file with feature switches (overrides --preset)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file; stdout when omitted"),
        )
        .get_matches();

    let features = match matches.get_one::<String>("features") {
        Some(path) => load_features(path),
        None => {
            let name = matches.get_one::<String>("preset").unwrap();
            presets::by_name(name).unwrap_or_else(|| {
                eprintln!("Unknown preset: {name}");
                std::process::exit(1);
            })
        }
    };

    let source = match matches.get_one::<String>("path") {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).unwrap_or_else(|e| {
                eprintln!("Error reading stdin: {e}");
                std::process::exit(1);
            });
            buffer
        }
    };

    let engine = Engine::new(Options::with_features(features));
    let html = engine.transform(&source);

    match matches.get_one::<String>("output") {
        Some(path) => {
            if let Err(e) = std::fs::write(PathBuf::from(path), html) {
                eprintln!("Error writing {path}: {e}");
                std::process::exit(1);
            }
        }
        None => print!("{html}"),
    }
}

/// Load a feature file; `.json` goes through serde_json, everything else
/// through serde_yaml (which also accepts JSON).
fn load_features(path: &str) -> Features {
    let raw = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {path}: {e}");
        std::process::exit(1);
    });
    let parsed = if path.ends_with(".json") {
        serde_json::from_str(&raw).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&raw).map_err(|e| e.to_string())
    };
    parsed.unwrap_or_else(|e| {
        eprintln!("Error parsing {path}: {e}");
        std::process::exit(1);
    })
}
