// iris command line driver
// Runs scripts that drive OpenCV captures, filters and windows

mod teardown;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iris_core::{read_all, Env, Environment, Evaluator, Interpreter, IrisConfig};
use iris_eye::{ArgPolicy, CaptureSession, SpecialFormRegistry, VisionConfig};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iris")]
#[command(about = "iris - scriptable OpenCV pipelines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML or JSON)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a script file
    Run {
        /// Script path
        script: PathBuf,
    },

    /// Interactive read-eval-print loop
    Repl,

    /// List the vision forms and their argument policies
    Forms,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.log.level, cli.verbose);
    let vision: VisionConfig = config.vision_section()?;
    let registry = SpecialFormRegistry::new(vision)?;

    match cli.command {
        Commands::Run { script } => {
            let interpreter = build_interpreter(&registry)?;
            run_script(&interpreter, &registry.session(), &script)?;
        }
        Commands::Repl => {
            let interpreter = build_interpreter(&registry)?;
            repl(&interpreter, &registry.session())?;
        }
        Commands::Forms => list_forms(&registry),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<IrisConfig> {
    let config = match path {
        Some(path) => IrisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => IrisConfig::default(),
    }
    .from_env();
    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str, verbose: bool) {
    let default_level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_interpreter(registry: &SpecialFormRegistry) -> Result<Interpreter> {
    let mut interpreter = Interpreter::new();
    registry.install(&mut interpreter)?;
    debug!("Installed forms: {:?}", interpreter.form_names());
    Ok(interpreter)
}

fn run_script(interpreter: &Interpreter, session: &CaptureSession, script: &Path) -> Result<()> {
    let source = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read {}", script.display()))?;
    info!("Running {}", script.display());

    let env = Environment::global();
    let result = eval_all(interpreter, &source, &env);
    teardown::release_resources(session, &env);
    result
}

/// Evaluate each top-level form, printing non-nil results.
fn eval_all(interpreter: &Interpreter, source: &str, env: &Env) -> Result<()> {
    for form in read_all(source)? {
        let value = interpreter.eval(&form, env)?;
        if !value.is_nil() {
            println!("{}", value);
        }
    }
    Ok(())
}

fn repl(interpreter: &Interpreter, session: &CaptureSession) -> Result<()> {
    let env = Environment::global();
    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut pending = String::new();

    loop {
        print!("{}", if pending.is_empty() { "iris> " } else { "  ... " });
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        pending.push_str(&line);
        if !is_complete(&pending) {
            continue;
        }

        let input = std::mem::take(&mut pending);
        match input.trim() {
            "" => continue,
            "(exit)" | ",q" => break,
            _ => {}
        }
        if let Err(e) = eval_all(interpreter, &input, &env) {
            eprintln!("Error: {}", e);
        }
    }

    teardown::release_resources(session, &env);
    Ok(())
}

/// True once every open parenthesis outside strings and comments is closed.
fn is_complete(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    !in_string && depth <= 0
}

fn list_forms(registry: &SpecialFormRegistry) {
    for symbol in registry.symbols() {
        let Some(spec) = registry.spec(symbol) else {
            continue;
        };
        let policies: Vec<&str> = spec
            .args
            .iter()
            .map(|policy| match policy {
                ArgPolicy::Literal => "literal",
                ArgPolicy::Evaluate => "evaluated",
            })
            .collect();
        println!("{:<30} ({})", symbol, policies.join(" "));
    }
}
