// =============================================================================
// SHADER BATCH - Build step turning shader sources into bytecode files
// =============================================================================
//
// ARCHITECTURE OVERVIEW:
// ┌─────────────────────────────────────────────────────────────────┐
// │  Manifest (config.toml-style [[shader]] tables)                 │
// │    └── Batch                                                    │
// │          ├── metadata     (Profile / Entrypoint validation)     │
// │          ├── output_path  (artifact destination)                │
// │          └── compiler     (ShaderCompiler capability)           │
// │                └── BuildLog (info + error diagnostics)          │
// └─────────────────────────────────────────────────────────────────┘
//
// Failures are logged per file and never abort the batch.
//
// =============================================================================

pub mod batch;
pub mod config;
pub mod error;

pub use batch::{Batch, BatchResult, BuildLog, DxcCompiler, InputItem, LogSink, ShaderCompiler};
pub use config::Config;
pub use error::{CompilerError, ErrorKind, ShaderError, ShaderResult};
