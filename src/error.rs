// Error types for the batch compiler
//
// Every per-file failure is a `ShaderError`. Its Display text is exactly the
// diagnostic line written to the build log, so the batch never has to format
// errors twice.

use thiserror::Error;

/// Result alias for operations that fail with a per-file error
pub type ShaderResult<T> = Result<T, ShaderError>;

/// Failures that can happen while processing a single shader file
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShaderError {
    #[error("{source_path}: CompileShader requires Profile.")]
    MissingProfile { source_path: String },

    #[error("{source_path}: CompileShader requires Entrypoint.")]
    MissingEntrypoint { source_path: String },

    #[error("{message}")]
    CompilerDiagnostic { message: String },

    #[error("{source_path}[{profile}, {entrypoint}]: {reason}")]
    Invocation {
        source_path: String,
        profile: String,
        entrypoint: String,
        reason: String,
    },

    #[error("{source_path}[{profile}, {entrypoint}]: {reason}")]
    Write {
        source_path: String,
        profile: String,
        entrypoint: String,
        reason: String,
    },
}

/// A compiler that could not run at all (missing program, unreadable file)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CompilerError(pub String);

/// Fieldless tag for matching on the kind of a `ShaderError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingProfile,
    MissingEntrypoint,
    CompilerDiagnostic,
    Invocation,
    Write,
}

impl ShaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingProfile { .. } => ErrorKind::MissingProfile,
            Self::MissingEntrypoint { .. } => ErrorKind::MissingEntrypoint,
            Self::CompilerDiagnostic { .. } => ErrorKind::CompilerDiagnostic,
            Self::Invocation { .. } => ErrorKind::Invocation,
            Self::Write { .. } => ErrorKind::Write,
        }
    }

    /// Build a diagnostic error, making sure the text names the source file
    pub fn diagnostic(source_path: &str, message: &str) -> Self {
        let message = message.trim_end();
        let message = if message.contains(source_path) {
            message.to_string()
        } else {
            format!("{}: {}", source_path, message)
        };
        Self::CompilerDiagnostic { message }
    }
}
