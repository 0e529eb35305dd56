//! Batch runs against a scripted compiler

use super::*;
use crate::batch::metadata::{ENTRYPOINT, OUTPUT_FILE_NAME, PROFILE};
use crate::error::CompilerError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Succeeds with `source|entry|profile` as bytecode unless told otherwise
#[derive(Default)]
struct FakeCompiler {
    diagnostics: HashMap<String, String>,
    broken: HashMap<String, String>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeCompiler {
    fn diagnostic(mut self, source: &str, message: &str) -> Self {
        self.diagnostics.insert(source.into(), message.into());
        self
    }

    fn broken(mut self, source: &str, reason: &str) -> Self {
        self.broken.insert(source.into(), reason.into());
        self
    }

    fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().clone()
    }
}

impl ShaderCompiler for FakeCompiler {
    fn compile(
        &self,
        source: &Path,
        entrypoint: &str,
        profile: &str,
    ) -> Result<CompilationOutcome, CompilerError> {
        let source = source.to_string_lossy().into_owned();
        self.calls
            .lock()
            .push((source.clone(), entrypoint.into(), profile.into()));

        if profile.is_empty() {
            return Err(CompilerError("unrecognized profile ''".into()));
        }
        if entrypoint.is_empty() {
            return Err(CompilerError("entry point '' not found".into()));
        }
        if let Some(reason) = self.broken.get(&source) {
            return Err(CompilerError(reason.clone()));
        }
        if let Some(message) = self.diagnostics.get(&source) {
            return Ok(CompilationOutcome::Failure(message.clone()));
        }
        Ok(CompilationOutcome::Success(
            format!("{}|{}|{}", source, entrypoint, profile).into_bytes(),
        ))
    }
}

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh output directory per test
fn scratch_dir() -> PathBuf {
    let n = DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("shader-batch-test-{}-{}", std::process::id(), n));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn shader(path: &str, profile: &str, entrypoint: &str) -> InputItem {
    InputItem::new(path)
        .with_metadata(PROFILE, profile)
        .with_metadata(ENTRYPOINT, entrypoint)
}

#[test]
fn test_single_file_default_output() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[shader("fx/a.hlsl", "ps_5_0", "main")]);

    let expected = out.join("fx/a.ps_5_0");
    assert!(result.succeeded);
    assert_eq!(result.produced, vec![expected.clone()]);
    assert_eq!(std::fs::read(&expected).unwrap(), b"fx/a.hlsl|main|ps_5_0");
    assert_eq!(
        compiler.calls(),
        vec![("fx/a.hlsl".into(), "main".into(), "ps_5_0".into())]
    );
    assert!(log.errors().is_empty());

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_diagnostic_messages() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    Batch::new(&compiler, &log, &out).run(&[shader("fx/a.hlsl", "ps_5_0", "main")]);

    let target = out.join("fx/a.ps_5_0");
    let messages = log.messages();
    assert_eq!(messages[0], format!("OutputPath: {}", out.display()));
    assert_eq!(messages[1], "fx/a.hlsl");
    assert_eq!(
        messages[2],
        format!("fx/a.hlsl: ps_5_0, main, {}", target.display())
    );

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_blank_rows_leave_no_trace() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[InputItem::new(""), InputItem::new("")]);

    assert!(result.succeeded);
    assert!(result.produced.is_empty());
    assert!(compiler.calls().is_empty());
    // Only the start banner
    assert_eq!(log.entries().len(), 1);
}

#[test]
fn test_blank_rows_between_real_ones() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[
        InputItem::new("").with_metadata(PROFILE, "ps_5_0"),
        shader("fx/a.hlsl", "ps_5_0", "main"),
        InputItem::new(""),
    ]);

    assert!(result.succeeded);
    assert_eq!(result.produced, vec![out.join("fx/a.ps_5_0")]);
    assert_eq!(compiler.calls().len(), 1);
    // Banner, then three lines for the one real file
    let messages = log.messages();
    assert_eq!(messages.len(), 4);
    assert!(messages[1..].iter().all(|m| m.starts_with("fx/a.hlsl")));
    assert!(log.errors().is_empty());

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_missing_profile_fails_batch() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[shader("fx/b.hlsl", "", "main")]);

    assert!(!result.succeeded);
    assert!(result.produced.is_empty());
    let missing: Vec<_> = log
        .errors()
        .into_iter()
        .filter(|e| e.contains("requires Profile"))
        .collect();
    assert_eq!(missing, vec!["fx/b.hlsl: CompileShader requires Profile.".to_string()]);
    // The file still reaches the compiler with its empty profile
    assert_eq!(compiler.calls().len(), 1);
}

// An entrypoint is validated on its own value, so a file with a profile but
// no entrypoint is reported as missing its entrypoint.
#[test]
fn test_missing_entrypoint_reported_even_with_profile() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[shader("fx/c.hlsl", "vs_5_0", "")]);

    assert!(!result.succeeded);
    let errors = log.errors();
    assert_eq!(
        errors
            .iter()
            .filter(|e| e.as_str() == "fx/c.hlsl: CompileShader requires Entrypoint.")
            .count(),
        1
    );
    assert!(!errors.iter().any(|e| e.contains("requires Profile")));
    assert!(result.produced.is_empty());
}

#[test]
fn test_compiler_diagnostic_skips_file_and_continues() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default().diagnostic("fx/bad.hlsl", "error X3000: syntax error");
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[
        shader("fx/a.hlsl", "ps_5_0", "main"),
        shader("fx/bad.hlsl", "ps_5_0", "main"),
        shader("fx/c.hlsl", "vs_5_0", "vs_main"),
    ]);

    assert!(!result.succeeded);
    assert_eq!(
        result.produced,
        vec![out.join("fx/a.ps_5_0"), out.join("fx/c.vs_5_0")]
    );
    assert!(!out.join("fx/bad.ps_5_0").exists());
    assert_eq!(
        log.errors(),
        vec!["fx/bad.hlsl: error X3000: syntax error".to_string()]
    );
    assert_eq!(compiler.calls().len(), 3);

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_invocation_failure_is_logged_with_context() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default().broken("fx/gone.hlsl", "file not found");
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[
        shader("fx/gone.hlsl", "ps_5_0", "main"),
        shader("fx/a.hlsl", "ps_5_0", "main"),
    ]);

    assert!(!result.succeeded);
    assert_eq!(result.produced, vec![out.join("fx/a.ps_5_0")]);
    assert_eq!(
        log.errors(),
        vec!["fx/gone.hlsl[ps_5_0, main]: file not found".to_string()]
    );

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_explicit_output_names() {
    let out = scratch_dir();
    let absolute = scratch_dir().join("abs/a.cso");
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[
        shader("fx/a.hlsl", "ps_5_0", "main")
            .with_metadata(OUTPUT_FILE_NAME, absolute.to_string_lossy()),
        shader("fx/b.hlsl", "vs_5_0", "main").with_metadata(OUTPUT_FILE_NAME, "named/b.cso"),
    ]);

    assert!(result.succeeded);
    assert_eq!(result.produced, vec![absolute.clone(), out.join("named/b.cso")]);
    assert!(absolute.is_file());
    assert!(out.join("named/b.cso").is_file());

    std::fs::remove_dir_all(&out).unwrap();
    std::fs::remove_dir_all(absolute.parent().unwrap().parent().unwrap()).unwrap();
}

#[test]
fn test_write_failure_is_reported_per_file() {
    let out = scratch_dir();
    std::fs::create_dir_all(&out).unwrap();
    // A file where the artifact directory should go
    std::fs::write(out.join("fx"), b"not a directory").unwrap();

    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let result = Batch::new(&compiler, &log, &out).run(&[
        shader("fx/a.hlsl", "ps_5_0", "main"),
        shader("b.hlsl", "ps_5_0", "main"),
    ]);

    assert!(!result.succeeded);
    assert_eq!(result.produced, vec![out.join("b.ps_5_0")]);
    let errors = log.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("fx/a.hlsl[ps_5_0, main]: cannot write"));

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_all_successful_in_input_order() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();
    let inputs: Vec<_> = ["z.hlsl", "m/y.hlsl", "a/b/x.hlsl"]
        .iter()
        .map(|p| shader(p, "cs_5_0", "main"))
        .collect();

    let result = Batch::new(&compiler, &log, &out).run(&inputs);

    assert!(result.succeeded);
    assert_eq!(
        result.produced,
        vec![
            out.join("z.cs_5_0"),
            out.join("m/y.cs_5_0"),
            out.join("a/b/x.cs_5_0"),
        ]
    );

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_parallel_run_keeps_input_order_and_attempts_everything() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default()
        .diagnostic("s3.hlsl", "error")
        .broken("s7.hlsl", "unreadable");
    let log = RecordingLog::new();
    let inputs: Vec<_> = (0..12)
        .map(|i| shader(&format!("s{}.hlsl", i), "ps_5_0", "main"))
        .collect();

    let result = Batch::new(&compiler, &log, &out).with_jobs(4).run(&inputs);

    assert!(!result.succeeded);
    let expected: Vec<_> = (0..12)
        .filter(|i| *i != 3 && *i != 7)
        .map(|i| out.join(format!("s{}.ps_5_0", i)))
        .collect();
    assert_eq!(result.produced, expected);
    assert_eq!(compiler.calls().len(), 12);
    assert_eq!(log.errors().len(), 2);

    std::fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_zero_jobs_means_sequential() {
    let out = scratch_dir();
    let compiler = FakeCompiler::default();
    let log = RecordingLog::new();

    let batch = Batch::new(&compiler, &log, &out).with_jobs(0);
    let result = batch.run(&[shader("a.hlsl", "ps_5_0", "main")]);

    assert!(result.succeeded);
    assert_eq!(batch.output_path(), out.as_path());

    std::fs::remove_dir_all(&out).unwrap();
}
