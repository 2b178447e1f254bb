use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use lumen::{Interpreter, Scanner};

/// Lumen is a small expression-oriented scripting language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run.
    script: PathBuf,

    /// Print the token stream as JSON instead of running.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the syntax tree as JSON instead of running.
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;
    let name = args.script.display().to_string();

    if args.dump_tokens {
        return dump_tokens(&name, &source);
    }
    if args.dump_ast {
        return dump_ast(&name, &source);
    }

    let mut interp = Interpreter::new(&name, io::stdin().lock(), io::stdout());
    if let Err(err) = interp.run(&source) {
        fail(&interp.render_fault(&err));
    }
    Ok(())
}

fn dump_tokens(name: &str, source: &str) -> anyhow::Result<()> {
    match Scanner::new(name, source).tokenize() {
        Ok(tokens) => {
            println!("{}", serde_json::to_string_pretty(&tokens)?);
            Ok(())
        }
        Err(err) => fail(&err.to_string()),
    }
}

fn dump_ast(name: &str, source: &str) -> anyhow::Result<()> {
    match lumen::Parser::new(Scanner::new(name, source)).and_then(|mut p| p.parse_all()) {
        Ok(nodes) => {
            println!("{}", serde_json::to_string_pretty(&nodes)?);
            Ok(())
        }
        Err(err) => fail(&err.to_string()),
    }
}

/// Script-level failures print their diagnostic block and exit 1,
/// leaving stdout holding only what the program produced.
fn fail(diagnostic: &str) -> ! {
    eprintln!("{}", diagnostic);
    std::process::exit(1);
}

/// Log output is opt-in via `RUST_LOG` and goes to stderr.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }
}
