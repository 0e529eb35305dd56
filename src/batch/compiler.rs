// Shader compiler capability
//
// The batch only needs one call: compile a file with an entry point and a
// profile. `DxcCompiler` drives an external dxc/fxc-style command line.

use crate::error::CompilerError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What a compiler run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationOutcome {
    Success(Vec<u8>),
    /// The compiler ran and flagged errors
    Failure(String),
}

pub trait ShaderCompiler: Send + Sync {
    /// `Err` means the compiler could not run at all
    fn compile(
        &self,
        source: &Path,
        entrypoint: &str,
        profile: &str,
    ) -> Result<CompilationOutcome, CompilerError>;
}

/// Invokes `<program> <args..> <source> -T <profile> -E <entrypoint> -Fo <tmp>`
#[derive(Debug, Clone)]
pub struct DxcCompiler {
    program: String,
    args: Vec<String>,
    scratch_dir: PathBuf,
}

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

impl DxcCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Extra arguments placed before the source file
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Directory for the compiler's temporary output files
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn scratch_file(&self) -> PathBuf {
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.scratch_dir
            .join(format!("shader-batch-{}-{}.bin", std::process::id(), n))
    }
}

impl Default for DxcCompiler {
    fn default() -> Self {
        Self::new("dxc")
    }
}

impl ShaderCompiler for DxcCompiler {
    fn compile(
        &self,
        source: &Path,
        entrypoint: &str,
        profile: &str,
    ) -> Result<CompilationOutcome, CompilerError> {
        if !source.is_file() {
            return Err(CompilerError(format!(
                "cannot read shader source {}",
                source.display()
            )));
        }

        let scratch = self.scratch_file();
        log::debug!(
            "{} {} {} -T {} -E {} -Fo {}",
            self.program,
            self.args.join(" "),
            source.display(),
            profile,
            entrypoint,
            scratch.display()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(source)
            .args(["-T", profile, "-E", entrypoint, "-Fo"])
            .arg(&scratch)
            .output()
            .map_err(|e| CompilerError(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let _ = std::fs::remove_file(&scratch);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let text = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).into_owned()
            } else {
                stderr.into_owned()
            };
            let text = if text.trim().is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                text
            };
            return Ok(CompilationOutcome::Failure(text));
        }

        let bytecode = std::fs::read(&scratch)
            .map_err(|e| CompilerError(format!("no bytecode at {}: {}", scratch.display(), e)))?;
        let _ = std::fs::remove_file(&scratch);
        Ok(CompilationOutcome::Success(bytecode))
    }
}
