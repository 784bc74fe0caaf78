//! Step outputs for downstream pipeline steps
//!
//! A run publishes exactly two outputs, `deleted` and `database_name`, and
//! only when it did not fail. [`publish_outputs`] is the single place that
//! writes them.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

pub const OUTPUT_DELETED: &str = "deleted";
pub const OUTPUT_DATABASE_NAME: &str = "database_name";

const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";
const HEREDOC_DELIMITER: &str = "DB_CLEANUP_EOF";

/// Destination for step outputs.
///
/// A batch is written all at once or not at all.
pub trait OutputSink {
    fn set_outputs(&self, outputs: &[(&str, &str)]) -> io::Result<()>;
}

/// Write both outputs of a run
pub fn publish_outputs(sink: &dyn OutputSink, deleted: bool, database_name: &str) -> io::Result<()> {
    sink.set_outputs(&[
        (OUTPUT_DELETED, if deleted { "true" } else { "false" }),
        (OUTPUT_DATABASE_NAME, database_name),
    ])
}

/// Render one output in the Actions file-command format
pub fn format_output(name: &str, value: &str) -> io::Result<String> {
    if !value.contains('\n') && !value.contains('\r') {
        return Ok(format!("{}={}\n", name, value));
    }

    if value.contains(HEREDOC_DELIMITER) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("value of output '{}' contains the delimiter", name),
        ));
    }

    Ok(format!(
        "{name}<<{delim}\n{value}\n{delim}\n",
        name = name,
        delim = HEREDOC_DELIMITER,
        value = value
    ))
}

/// Render a whole batch, failing before anything is written
fn format_outputs(outputs: &[(&str, &str)]) -> io::Result<String> {
    outputs
        .iter()
        .map(|(name, value)| format_output(name, value))
        .collect()
}

/// Appends outputs to the file named by `$GITHUB_OUTPUT`
#[derive(Debug, Clone)]
pub struct GithubOutputFile {
    path: PathBuf,
}

impl GithubOutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `$GITHUB_OUTPUT` when the runner provides it
    pub fn from_env() -> Option<Self> {
        std::env::var_os(OUTPUT_FILE_VAR)
            .filter(|v| !v.is_empty())
            .map(Self::new)
    }
}

impl OutputSink for GithubOutputFile {
    fn set_outputs(&self, outputs: &[(&str, &str)]) -> io::Result<()> {
        let lines = format_outputs(outputs)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(lines.as_bytes())
    }
}

/// Prints `name=value` lines, for runs outside of Actions
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn set_outputs(&self, outputs: &[(&str, &str)]) -> io::Result<()> {
        let lines = format_outputs(outputs)?;
        let mut out = io::stdout().lock();
        out.write_all(lines.as_bytes())?;
        out.flush()
    }
}

/// Records outputs in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, in order
    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs
            .lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }

    /// Latest value written for `name`
    pub fn get(&self, name: &str) -> Option<String> {
        self.outputs()
            .into_iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl OutputSink for MemorySink {
    fn set_outputs(&self, outputs: &[(&str, &str)]) -> io::Result<()> {
        self.outputs
            .lock()
            .map_err(|_| io::Error::other("output sink poisoned"))?
            .extend(
                outputs
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string())),
            );
        Ok(())
    }
}
