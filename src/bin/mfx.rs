//! Mathfield CLI - inspect and normalize editable-math LaTeX

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read};

#[cfg(feature = "cli")]
use mathfield::{
    latex_to_mathspeak, latex_to_text, normalize_latex, try_parse_latex, Diagnostic, MathField,
    Severity, Tree, DEFAULT_REGISTRY,
};
#[cfg(feature = "cli")]
use std::rc::Rc;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mfx")]
#[command(author = "SciPenAI")]
#[command(version)]
#[command(about = "Mathfield - editable-math LaTeX inspector", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output rendition
    #[arg(short, long, value_enum, default_value_t = Rendition::Latex)]
    format: Rendition,

    /// Emit all renditions as a JSON object
    #[arg(long)]
    json: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Check LaTeX for parse problems without rendering
    Check {
        /// Input file to check
        input: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Replay a sequence of setLatex calls (one per line), reporting
    /// which steps took the incremental path
    Replay {
        /// Input file with one LaTeX string per line
        input: Option<String>,
    },

    /// Show version and feature info
    Info,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Rendition {
    /// Normalized LaTeX
    Latex,
    /// Plain text
    Text,
    /// Mathspeak
    Speak,
}

#[cfg(feature = "cli")]
fn read_input(path: &Option<String>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn print_diagnostic(diag: &Diagnostic, color: bool) {
    if color {
        println!("{}{}\x1b[0m", diag.color_code(), diag);
    } else {
        println!("{}", diag);
    }
}

#[cfg(feature = "cli")]
fn handle_check(input: Option<String>, no_color: bool) -> io::Result<()> {
    let latex = read_input(&input)?;
    let latex = latex.trim_end_matches('\n');
    let mut tree = Tree::new();
    let registry = Rc::new(DEFAULT_REGISTRY.clone());
    match try_parse_latex(&mut tree, &registry, latex) {
        Ok(_) => {
            println!("ok");
            Ok(())
        }
        Err(failure) => {
            let diag = Diagnostic::new(Severity::Error, "parse failure", failure.to_string())
                .with_location(latex.to_string());
            print_diagnostic(&diag, !no_color);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn handle_replay(input: Option<String>) -> io::Result<()> {
    let content = read_input(&input)?;
    let mut field = MathField::new();
    for line in content.lines() {
        let before = field.latex();
        let patched = field.set_latex(line);
        let path = if patched { "patched" } else { "rebuilt" };
        println!("{} -> {} [{}]", before, field.latex(), path);
        for warning in field.take_diagnostics() {
            print_diagnostic(&warning, true);
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(cmd) = cli.command {
        return match cmd {
            Commands::Check { input, no_color } => handle_check(input, no_color),
            Commands::Replay { input } => handle_replay(input),
            Commands::Info => {
                println!("mathfield {}", env!("CARGO_PKG_VERSION"));
                println!("features: cli{}", if cfg!(feature = "wasm") { ", wasm" } else { "" });
                println!("registered commands: {}", DEFAULT_REGISTRY.len());
                Ok(())
            }
        };
    }

    let input = read_input(&cli.input_file)?;
    let latex = input.trim_end_matches('\n');

    if cli.json {
        let output = serde_json::json!({
            "latex": normalize_latex(latex),
            "text": latex_to_text(latex),
            "mathspeak": latex_to_mathspeak(latex),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).map_err(io::Error::other)?
        );
        return Ok(());
    }

    let rendered = match cli.format {
        Rendition::Latex => normalize_latex(latex),
        Rendition::Text => latex_to_text(latex),
        Rendition::Speak => latex_to_mathspeak(latex),
    };
    match rendered {
        Some(out) => {
            println!("{}", out);
            Ok(())
        }
        None => {
            eprintln!("error: input failed to parse");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install mathfield --features cli");
    eprintln!("  mfx [OPTIONS] [INPUT_FILE]");
}
