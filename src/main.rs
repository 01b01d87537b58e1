//! fishc Command Line Interface
//!
//! Usage:
//!   fishc [OPTIONS] <input-file>
//!   fishc --help
//!
//! Examples:
//!   fishc program.fish                     # Parse and check, report diagnostics
//!   fishc --emit=tokens program.fish       # Dump the token stream
//!   fishc --emit=ast --json program.fish   # AST as JSON
//!   fishc --strip-whitespace program.fish  # Remove all whitespace before lexing

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use fishc::frontend::{self, Node, Token};
use fishc::utils::errors::{Diagnostic, ParseError};
use fishc::utils::SourceMap;
use fishc::{FrontendConfig, WhitespaceMode};
use log::{debug, error, info};
use std::fs;
use std::path::PathBuf;

/// fishc - Front end for the Fish language
#[derive(Parser, Debug)]
#[command(name = "fishc")]
#[command(author = "fishc Contributors")]
#[command(version)]
#[command(about = "Lexer, parser and semantic checker for Fish programs", long_about = None)]
struct Cli {
    /// Input file (.fish source)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, default_value = "check")]
    emit: EmitKind,

    /// Remove every whitespace character after comment removal
    #[arg(long)]
    strip_whitespace: bool,

    /// Render tokens, AST or diagnostics as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Token stream produced by the lexer
    Tokens,
    /// Abstract Syntax Tree
    Ast,
    /// Semantic diagnostics
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("fishc v{}", fishc::VERSION);
    debug!("Input file: {:?}", cli.input);

    let config = build_config(&cli);
    debug!("Frontend config: {:?}", config);

    // Read input file
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file: {:?}", cli.input))?;
    let text = frontend::preprocess(&source, config.whitespace);

    let tokens = frontend::tokenize(&text);
    if matches!(cli.emit, EmitKind::Tokens) {
        let output = render_tokens(&tokens, cli.json)?;
        return write_output(&cli.output, &output);
    }

    info!("Parsing...");
    let ast = match frontend::Parser::new(tokens).parse() {
        Ok(ast) => ast,
        Err(e) => {
            if cli.json {
                write_output(&cli.output, &parse_error_json(&e)?)?;
            }
            error!("{}", e);
            show_line(&SourceMap::new(text.as_str()), e.line());
            bail!("Failed to parse {:?}", cli.input);
        }
    };

    if matches!(cli.emit, EmitKind::Ast) {
        let output = render_ast(&ast, cli.json)?;
        return write_output(&cli.output, &output);
    }

    info!("Checking...");
    let diagnostics = frontend::analyze(&ast);
    // Without --json or -o the diagnostics only go to the log.
    if cli.json || cli.output.is_some() {
        let output = render_diagnostics(&diagnostics, cli.json)?;
        write_output(&cli.output, &output)?;
    }

    if !diagnostics.is_empty() {
        let map = SourceMap::new(text.as_str());
        for diagnostic in &diagnostics {
            error!("{}", diagnostic);
            show_line(&map, Some(diagnostic.line));
        }
        bail!("{} semantic error(s) found", diagnostics.len());
    }

    info!("No semantic errors found");
    Ok(())
}

fn build_config(cli: &Cli) -> FrontendConfig {
    FrontendConfig {
        whitespace: if cli.strip_whitespace {
            WhitespaceMode::Strip
        } else {
            WhitespaceMode::Preserve
        },
    }
}

fn render_tokens(tokens: &[Token], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(tokens).context("Failed to serialize tokens");
    }
    let lines: Vec<String> = tokens
        .iter()
        .map(|token| {
            let line = token.line().map_or_else(|| "-".to_string(), |l| l.to_string());
            format!("{:>4}  {:<18} {}", line, token.kind.name(), token.lexeme)
        })
        .collect();
    Ok(lines.join("\n"))
}

fn render_ast(ast: &Node, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(ast).context("Failed to serialize AST")
    } else {
        Ok(ast.pretty())
    }
}

fn render_diagnostics(diagnostics: &[Diagnostic], json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(diagnostics).context("Failed to serialize diagnostics");
    }
    let lines: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
    Ok(lines.join("\n"))
}

fn parse_error_json(e: &ParseError) -> Result<String> {
    let value = serde_json::json!({
        "message": e.message,
        "line": e.line(),
        "expected": e.expected,
        "found": e.found,
    });
    serde_json::to_string_pretty(&value).context("Failed to serialize parse error")
}

/// Echo the offending source line under a log message.
fn show_line(map: &SourceMap, line: Option<usize>) {
    if let Some((number, text)) = line.and_then(|n| map.line(n).map(|text| (n, text))) {
        eprintln!("{:>5} | {}", number, text);
    }
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
