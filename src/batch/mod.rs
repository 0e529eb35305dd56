// =============================================================================
// BATCH - Compile a list of shader files into bytecode artifacts
// =============================================================================
//
// Per file:  metadata -> output path -> compile -> write (or skip)
//
// Every failure is logged and the batch moves on to the next file. The run
// succeeded only if nothing was logged as an error.

pub mod compiler;
pub mod diagnostics;
pub mod metadata;
pub mod output_path;

#[cfg(test)]
mod tests;

pub use compiler::{CompilationOutcome, DxcCompiler, ShaderCompiler};
pub use diagnostics::{BuildLog, Diagnostic, Level, LogSink, RecordingLog};
pub use metadata::{InputItem, SourceFileRequest};

use crate::error::{ShaderError, ShaderResult};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Outcome of one batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// Written artifacts, in input order
    pub produced: Vec<PathBuf>,
    /// False if any error was logged during the run
    pub succeeded: bool,
}

pub struct Batch<'a> {
    compiler: &'a dyn ShaderCompiler,
    log: &'a dyn BuildLog,
    output_path: PathBuf,
    jobs: usize,
}

/// Counts errors as they go out so success does not depend on the sink
struct Reporter<'a> {
    log: &'a dyn BuildLog,
    errors: AtomicUsize,
}

impl<'a> Reporter<'a> {
    fn message(&self, text: &str) {
        self.log.message(text);
    }

    fn error(&self, err: &ShaderError) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        self.log.error(&err.to_string());
    }
}

impl<'a> Batch<'a> {
    pub fn new(
        compiler: &'a dyn ShaderCompiler,
        log: &'a dyn BuildLog,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            compiler,
            log,
            output_path: output_path.into(),
            jobs: 1,
        }
    }

    /// Compile on up to `jobs` threads. 0 and 1 both mean sequential.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Process every item; never stops early
    pub fn run(&self, inputs: &[InputItem]) -> BatchResult {
        let reporter = Reporter {
            log: self.log,
            errors: AtomicUsize::new(0),
        };
        reporter.message(&format!("OutputPath: {}", self.output_path.display()));

        let produced = if self.jobs > 1 && inputs.len() > 1 {
            self.run_parallel(inputs, &reporter)
        } else {
            inputs
                .iter()
                .filter_map(|item| self.process(item, &reporter))
                .collect()
        };

        let errors = reporter.errors.load(Ordering::Relaxed);
        log::debug!(
            "batch finished: {} of {} written, {} error(s)",
            produced.len(),
            inputs.len(),
            errors
        );
        BatchResult {
            produced,
            succeeded: errors == 0,
        }
    }

    fn run_parallel(&self, inputs: &[InputItem], reporter: &Reporter) -> Vec<PathBuf> {
        let next = AtomicUsize::new(0);
        let produced = Mutex::new(Vec::with_capacity(inputs.len()));

        std::thread::scope(|scope| {
            for _ in 0..self.jobs.min(inputs.len()) {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(item) = inputs.get(index) else {
                        break;
                    };
                    if let Some(path) = self.process(item, reporter) {
                        produced.lock().push((index, path));
                    }
                });
            }
        });

        let mut produced = produced.into_inner();
        produced.sort_by_key(|(index, _)| *index);
        produced.into_iter().map(|(_, path)| path).collect()
    }

    /// Returns the written path, or `None` for skipped and failed files
    fn process(&self, item: &InputItem, reporter: &Reporter) -> Option<PathBuf> {
        let (request, errors) = metadata::resolve(item)?;

        reporter.message(&request.source_path);
        for err in &errors {
            reporter.error(err);
        }

        let output = output_path::resolve(&request, &self.output_path);
        reporter.message(&format!(
            "{}: {}, {}, {}",
            request.source_path,
            request.profile,
            request.entrypoint,
            output.display()
        ));

        match self.compile_and_write(&request, &output) {
            Ok(size) => {
                reporter.message(&format!(
                    "{} -> {} ({} bytes)",
                    request.source_path,
                    output.display(),
                    size
                ));
                Some(output)
            }
            Err(err) => {
                reporter.error(&err);
                None
            }
        }
    }

    fn compile_and_write(&self, request: &SourceFileRequest, output: &Path) -> ShaderResult<usize> {
        let outcome = self
            .compiler
            .compile(
                Path::new(&request.source_path),
                &request.entrypoint,
                &request.profile,
            )
            .map_err(|e| ShaderError::Invocation {
                source_path: request.source_path.clone(),
                profile: request.profile.clone(),
                entrypoint: request.entrypoint.clone(),
                reason: e.to_string(),
            })?;

        match outcome {
            CompilationOutcome::Failure(message) => {
                Err(ShaderError::diagnostic(&request.source_path, &message))
            }
            CompilationOutcome::Success(bytecode) => {
                write_artifact(output, &bytecode).map_err(|e| ShaderError::Write {
                    source_path: request.source_path.clone(),
                    profile: request.profile.clone(),
                    entrypoint: request.entrypoint.clone(),
                    reason: format!("cannot write {}: {}", output.display(), e),
                })?;
                Ok(bytecode.len())
            }
        }
    }
}

fn write_artifact(path: &Path, bytecode: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, bytecode)
}
