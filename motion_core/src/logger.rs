//! Human-readable diagnostic sink for the host UI log.
//!
//! Separate from `tracing`: these are the few lines a user sees ("Sleep for
//! 20000ms", "Distance moved: 3.2 m"). Failures to write are ignored.

use std::path::PathBuf;

pub trait DiagnosticSink {
    fn note(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn note(&self, _message: &str) {}
}

/// Appends one line per note to a file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DiagnosticSink for FileSink {
    fn note(&self, message: &str) {
        use std::fs::OpenOptions;
        use std::io::Write;
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
        {
            let _ = writeln!(file, "{}", message);
        }
    }
}
