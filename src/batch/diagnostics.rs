// Diagnostics channel
//
// The batch reports through a `BuildLog` instead of writing to the logger
// directly, so the host decides where messages end up.

use parking_lot::Mutex;

/// Sink for informational and error messages produced by a batch run
pub trait BuildLog: Send + Sync {
    fn message(&self, text: &str);
    fn error(&self, text: &str);
}

/// Forwards everything to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl BuildLog for LogSink {
    fn message(&self, text: &str) {
        log::info!("{}", text);
    }

    fn error(&self, text: &str) {
        log::error!("{}", text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub text: String,
}

/// Keeps every diagnostic in memory, in the order it was emitted
#[derive(Debug, Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.texts(Level::Error)
    }

    pub fn messages(&self) -> Vec<String> {
        self.texts(Level::Info)
    }

    fn texts(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.level == level)
            .map(|d| d.text.clone())
            .collect()
    }

    fn push(&self, level: Level, text: &str) {
        self.entries.lock().push(Diagnostic {
            level,
            text: text.to_string(),
        });
    }
}

impl BuildLog for RecordingLog {
    fn message(&self, text: &str) {
        self.push(Level::Info, text);
    }

    fn error(&self, text: &str) {
        self.push(Level::Error, text);
    }
}
