mod runtime;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use runtime::{GenerateFlags, init_file_logging, init_stderr_logging, load_config};
use schemagen_generate::{
    DescriptionRoutine, GenerationEngine, GenerationError, GeneratorRegistry, Routine, samples,
};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("runtime error: {0}")]
    Runtime(#[from] runtime::RuntimeError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "schemagen", version, about = "Schemagen synthetic data CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run sample routines and schema description files.
    Generate(GenerateArgs),
    /// List the built-in sample routines.
    Samples,
    /// List the generator ids usable in schema descriptions.
    Generators,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Built-in sample routine to run (repeatable).
    #[arg(long = "sample", value_name = "NAME")]
    samples: Vec<String>,
    /// JSON schema description file; the dataset is named after the file stem (repeatable).
    #[arg(long = "schema", value_name = "FILE")]
    schemas: Vec<PathBuf>,
    /// Output directory for datasets.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Cap every generated array at 10 elements.
    #[arg(long, default_value_t = false)]
    preview: bool,
    /// Indent the exported JSON.
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// Bundle every dataset into <output>/data.zip.
    #[arg(long, default_value_t = false)]
    zip: bool,
    /// Skip generation_report.json.
    #[arg(long, default_value_t = false)]
    no_report: bool,
    /// Config file (defaults to ./schemagen.toml when present).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write JSON logs to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Samples => {
            for routine in samples::all() {
                println!("{:<16} {}", routine.name(), routine.description());
            }
            Ok(())
        }
        Command::Generators => {
            let registry = GeneratorRegistry::new();
            for entry in registry.entries() {
                let params: Vec<&str> = entry.params.iter().map(|param| param.key).collect();
                if params.is_empty() {
                    println!("{:<24} {}", entry.id, entry.summary);
                } else {
                    println!(
                        "{:<24} {} (params: {})",
                        entry.id,
                        entry.summary,
                        params.join(", ")
                    );
                }
            }
            Ok(())
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        samples: sample_names,
        schemas,
        output,
        preview,
        pretty,
        seed,
        zip,
        no_report,
        config,
        log_file,
    } = args;

    let config = load_config(config.as_deref())?;
    match log_file.or_else(|| config.log_file.clone()) {
        Some(path) => init_file_logging(&path)?,
        None => init_stderr_logging()?,
    }

    if sample_names.is_empty() && schemas.is_empty() {
        return Err(CliError::InvalidConfig(
            "nothing to generate: pass --sample or --schema".to_string(),
        ));
    }

    let flags = GenerateFlags {
        out_dir: output,
        preview,
        pretty,
        seed,
        no_report,
        zip,
    };
    let options = config.generate_options(&flags);

    let mut sample_routines = Vec::with_capacity(sample_names.len());
    for name in &sample_names {
        let routine = samples::find(name).ok_or_else(|| {
            let known: Vec<String> = samples::all()
                .iter()
                .map(|routine| routine.name().to_string())
                .collect();
            CliError::InvalidConfig(format!(
                "unknown sample '{name}' (available: {})",
                known.join(", ")
            ))
        })?;
        sample_routines.push(routine);
    }

    let registry = GeneratorRegistry::new();
    let description_routines = schemas
        .iter()
        .map(|path| DescriptionRoutine::from_path(path, &registry))
        .collect::<Result<Vec<_>, _>>()?;

    let mut routines: Vec<&dyn Routine> =
        sample_routines.iter().map(|routine| &**routine).collect();
    routines.extend(description_routines.iter().map(|routine| routine as &dyn Routine));

    let timer = Instant::now();
    tracing::info!(event = "run_started", routines = routines.len(), preview = options.preview);

    let result = GenerationEngine::new(options).run(&routines)?;

    for dataset in &result.report.datasets {
        println!("{} -> {}", dataset.name, dataset.path.display());
    }
    tracing::info!(
        event = "run_finished",
        status = "success",
        run_id = %result.report.run_id,
        seed = result.report.seed,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    Ok(())
}
