use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use gh_aw_compiler::{compile, compile_batch, lock_path_for, CompileOptions};

/// gh-aw — compile agentic workflow Markdown into GitHub Actions lock files.
#[derive(Parser)]
#[command(name = "gh-aw", version, about)]
struct Cli {
    /// Enable verbose diagnostic output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one or more workflow Markdown files into `.lock.yml`.
    Compile {
        /// Input workflow Markdown file(s).
        inputs: Vec<PathBuf>,

        /// Output path (only valid with a single input; defaults to
        /// `<name>.lock.yml` alongside the source).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also validate the emitted document against GitHub's own
        /// workflow JSON Schema before writing it.
        #[arg(long)]
        validate_schema: bool,
    },

    /// Validate a workflow without writing a lock file.
    Lint {
        /// Input workflow Markdown file.
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("gh_aw=debug").init();
    }

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(run(cli.command))
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Compile {
            inputs,
            output,
            validate_schema,
        } => run_compile(inputs, output, validate_schema).await,
        Commands::Lint { input } => run_lint(input).await,
    }
}

async fn run_compile(inputs: Vec<PathBuf>, output: Option<PathBuf>, validate_schema: bool) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("at least one input file is required");
    }
    if output.is_some() && inputs.len() > 1 {
        anyhow::bail!("--output may only be used with a single input file");
    }

    let options = CompileOptions {
        validate_schema,
        ..CompileOptions::default()
    };
    let cancellation = CancellationToken::new();

    if let [single] = inputs.as_slice() {
        let output_path = output.unwrap_or_else(|| lock_path_for(single));
        match compile(single, &options, &cancellation).await {
            Ok(result) => {
                gh_aw_emit::write_atomic(&output_path, &result.yaml)
                    .with_context(|| format!("failed to write {}", output_path.display()))?;
                for warning in &result.warnings {
                    eprint!("{warning}");
                }
                eprintln!("compiled {} -> {}", single.display(), output_path.display());
                Ok(())
            }
            Err(err) => report_and_exit(&err),
        }
    } else {
        let results = compile_batch(&inputs, &options, &cancellation).await;
        let mut failures = 0;
        for (input, result) in inputs.iter().zip(results) {
            let output_path = lock_path_for(input);
            match result {
                Ok(compiled) => {
                    if let Err(e) = gh_aw_emit::write_atomic(&output_path, &compiled.yaml) {
                        eprintln!("error: failed to write {}: {e}", output_path.display());
                        failures += 1;
                        continue;
                    }
                    eprintln!("compiled {} -> {}", input.display(), output_path.display());
                }
                Err(err) => {
                    for diagnostic in err.diagnostics() {
                        eprint!("{diagnostic}");
                    }
                    if err.diagnostics().is_empty() {
                        eprintln!("error: {input:?}: {err}");
                    }
                    failures += 1;
                }
            }
        }
        if failures > 0 {
            anyhow::bail!("{failures} of {} workflow(s) failed to compile", inputs.len());
        }
        Ok(())
    }
}

async fn run_lint(input: PathBuf) -> Result<()> {
    let options = CompileOptions::default();
    let cancellation = CancellationToken::new();
    match compile(&input, &options, &cancellation).await {
        Ok(result) => {
            if result.warnings.is_empty() {
                eprintln!("{}: no issues found", input.display());
            } else {
                for warning in &result.warnings {
                    eprint!("{warning}");
                }
                eprintln!("{}: {} warning(s)", input.display(), result.warnings.len());
            }
            Ok(())
        }
        Err(err) => report_and_exit(&err),
    }
}

fn report_and_exit(err: &gh_aw_core::CompileError) -> Result<()> {
    let diagnostics = err.diagnostics();
    if diagnostics.is_empty() {
        eprintln!("error: {err}");
    } else {
        for diagnostic in diagnostics {
            eprint!("{diagnostic}");
        }
    }
    std::process::exit(err.exit_code());
}
