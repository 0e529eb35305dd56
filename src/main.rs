// =============================================================================
// SHADER BATCH - Command line entry point
// =============================================================================
//
// FLOW:
// 1. Parse arguments, load the manifest
// 2. Initialize logging
// 3. Run the batch with the configured compiler
// 4. Print produced artifacts, exit non-zero if any error was logged
//
// =============================================================================

use anyhow::Result;
use clap::Parser;
use shader_batch::{Batch, Config, DxcCompiler, LogSink};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shader-batch")]
#[command(version)]
#[command(about = "Compile shader sources listed in a manifest into bytecode files", long_about = None)]
struct Cli {
    /// Manifest listing the shaders to compile
    #[arg(short, long, value_name = "FILE", default_value = "shaders.toml")]
    manifest: PathBuf,

    /// Base directory for artifacts (overrides build.output_path)
    #[arg(short, long, value_name = "DIR")]
    output_path: Option<String>,

    /// Compiler program (overrides compiler.program)
    #[arg(short, long, value_name = "PROGRAM")]
    compiler: Option<String>,

    /// Number of files compiled at once (overrides build.jobs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load_from_path(&cli.manifest)?;

    init_logging(&config, cli.verbose);
    log::debug!(
        "Loaded manifest from {:?}: {} shader(s)",
        cli.manifest,
        config.shaders.len()
    );

    let output_path = cli.output_path.unwrap_or(config.build.output_path);
    let jobs = cli.jobs.unwrap_or(config.build.jobs);
    let compiler = DxcCompiler::new(cli.compiler.unwrap_or(config.compiler.program))
        .with_args(config.compiler.args);
    log::debug!("Compiler: {} ({} job(s))", compiler.program(), jobs);

    let result = Batch::new(&compiler, &LogSink, output_path)
        .with_jobs(jobs)
        .run(&config.shaders);

    for path in &result.produced {
        println!("{}", path.display());
    }

    if result.succeeded {
        Ok(ExitCode::SUCCESS)
    } else {
        log::error!("Shader compilation failed");
        Ok(ExitCode::FAILURE)
    }
}

/// Initialize logging; RUST_LOG still overrides the manifest level
fn init_logging(config: &Config, verbose: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let configured = config.log_level();
    let level = if verbose {
        LevelFilter::Debug
    } else {
        configured.unwrap_or(LevelFilter::Info)
    };

    let mut builder = Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.init();

    if configured.is_none() {
        log::warn!(
            "Unknown log level '{}', defaulting to {}",
            config.logging.level,
            level.as_str().to_lowercase()
        );
    }
}
