use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rill_cli::{eval, repl};

/// Maximum source file size in bytes (1MB)
const MAX_SOURCE_SIZE: usize = 1_000_000;

#[derive(Parser, Debug)]
#[command(name = "rill")]
#[command(about = "Rill: a small tree-walking scripting language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a Rill source file
    Run {
        /// Path to .rill source file
        file: String,

        /// Print the token stream before evaluating
        #[arg(long)]
        dump_tokens: bool,
    },

    /// Parse a source file and dump the AST
    Parse {
        /// Path to .rill source file
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// Start an interactive session
    Repl,
}

#[derive(ValueEnum, Clone, Debug)]
enum Format {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { file, dump_tokens } => cmd_run(&file, dump_tokens),
        Commands::Parse { file, format } => cmd_parse(&file, format),
        Commands::Repl => repl::run(),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn load_source(path: &str) -> Result<String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("could not read file '{path}': {e}"))?;
    if src.len() > MAX_SOURCE_SIZE {
        bail!(
            "source file exceeds {}MB limit ({} bytes)",
            MAX_SOURCE_SIZE / 1_000_000,
            src.len()
        );
    }
    Ok(src)
}

fn cmd_run(file: &str, dump_tokens: bool) -> Result<()> {
    let src = load_source(file)?;
    let tokens = rill_parse::scan(&src)?;
    if dump_tokens {
        for tok in &tokens {
            println!("{tok}");
        }
    }
    let block = rill_parse::parse(tokens)?;
    // only explicit `print` produces output; the final value is dropped
    eval::evaluate(&block, None)?;
    Ok(())
}

fn cmd_parse(file: &str, format: Format) -> Result<()> {
    let src = load_source(file)?;
    let block = rill_parse::parse_str(&src)?;
    match format {
        Format::Pretty => println!("{block:#?}"),
        Format::Json => println!("{}", serde_json::to_string_pretty(&block)?),
    }
    Ok(())
}
