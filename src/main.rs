//! Template Weaver CLI
//!
//! Usage:
//!   template-weaver [OPTIONS] resolve <NAME> [--var k=v]... [--slot name=content]... [--variant v]
//!   template-weaver [OPTIONS] compose [--file request.json]
//!   template-weaver [OPTIONS] list
//!
//! Options:
//!   -r, --registry <FILE>   Registry document (TOML, created on first use)
//!   -t, --templates <DIR>   Template resource directory
//!   -v, --verbose           Increase log output (repeatable)

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use template_weaver::{
    CompositionRequest, ContextValue, Engine, EngineConfig, ResolveContext,
};

#[derive(Parser)]
#[command(name = "template-weaver")]
#[command(about = "Template inheritance and composition engine")]
struct Cli {
    /// Registry document (TOML); omit to use the built-in template set
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    /// Template resource directory
    #[arg(short, long, global = true, default_value = "templates")]
    templates: PathBuf,

    /// Increase log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a template into rendered text
    Resolve {
        /// Template name (base, child or composite)
        name: String,

        /// Context variable as key=value; true/false and numbers are typed
        #[arg(long = "var", value_parser = parse_key_value)]
        vars: Vec<(String, String)>,

        /// Slot content as name=content
        #[arg(long = "slot", value_parser = parse_key_value)]
        slots: Vec<(String, String)>,

        /// Variant to apply
        #[arg(long)]
        variant: Option<String>,
    },

    /// Compose a template configuration from a JSON request
    Compose {
        /// Request file (reads from stdin if not provided)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List registered templates
    List,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn parse_context_value(raw: &str) -> ContextValue {
    if raw.eq_ignore_ascii_case("true") {
        return ContextValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return ContextValue::Bool(false);
    }
    if let Ok(number) = raw.parse::<f64>() {
        return ContextValue::Number(number);
    }
    ContextValue::from(raw)
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = EngineConfig::new().with_templates_dir(&cli.templates);
    if let Some(path) = &cli.registry {
        config = config.with_registry_path(path);
    }

    let engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Resolve {
            name,
            vars,
            slots,
            variant,
        } => {
            let mut ctx = ResolveContext::new();
            for (key, value) in vars {
                ctx = ctx.with_var(key, parse_context_value(&value));
            }
            for (slot, content) in slots {
                ctx = ctx.with_slot(slot, content);
            }
            if let Some(variant) = variant {
                ctx = ctx.with_variant(variant);
            }

            match engine.resolve_template(&name, &ctx) {
                Ok(output) => println!("{}", output),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    let suggestions = e.suggestions();
                    if !suggestions.is_empty() {
                        eprintln!("Did you mean: {}?", suggestions.join(", "));
                    }
                    std::process::exit(1);
                }
            }
        }

        Command::Compose { file } => {
            let source = match &file {
                Some(path) => match fs::read_to_string(path) {
                    Ok(content) => content,
                    Err(e) => {
                        eprintln!("Error reading file '{}': {}", path.display(), e);
                        std::process::exit(1);
                    }
                },
                None => {
                    let mut buffer = String::new();
                    match io::stdin().read_to_string(&mut buffer) {
                        Ok(_) => buffer,
                        Err(e) => {
                            eprintln!("Error reading from stdin: {}", e);
                            std::process::exit(1);
                        }
                    }
                }
            };

            let request: CompositionRequest = match serde_json::from_str(&source) {
                Ok(request) => request,
                Err(e) => {
                    eprintln!("Error parsing request: {}", e);
                    std::process::exit(1);
                }
            };

            let result = engine.compose(&request);
            match serde_json::to_string_pretty(&result) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Command::List => {
            println!("Base templates:");
            for name in engine.base_names() {
                println!("  {}", name);
            }
            println!("Child templates:");
            for name in engine.child_names() {
                println!("  {}", name);
            }
            println!("Composite templates:");
            for name in engine.composite_names() {
                println!("  {}", name);
            }
        }
    }
}
