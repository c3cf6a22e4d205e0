//! PID → process name lookup for the PROCESS column.
//!
//! Events are rendered after the fact, so the process may already be gone.
//! A miss is an expected outcome and renders as [`PROCESS_PLACEHOLDER`].

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::domain::Pid;

/// Rendered when the process is no longer in the process table
pub const PROCESS_PLACEHOLDER: &str = "<empty>";

/// Source of process names
///
/// Injected into the renderer so tests can substitute a fixed mapping.
pub trait ProcessNames {
    /// Short executable name of `pid`, if the process still exists
    fn name_of(&self, pid: Pid) -> Option<String>;

    /// Name of `pid`, or [`PROCESS_PLACEHOLDER`]
    fn name_or_placeholder(&self, pid: Pid) -> String {
        self.name_of(pid).unwrap_or_else(|| PROCESS_PLACEHOLDER.to_string())
    }
}

/// Reads `comm` from `/proc/<pid>/stat`
#[derive(Debug, Clone)]
pub struct ProcfsNames {
    proc_root: PathBuf,
}

impl ProcfsNames {
    #[must_use]
    pub fn new() -> Self {
        Self { proc_root: PathBuf::from("/proc") }
    }

    /// Use a different procfs mount (containers, tests)
    #[must_use]
    pub fn with_root(proc_root: impl Into<PathBuf>) -> Self {
        Self { proc_root: proc_root.into() }
    }

    fn read_comm(&self, pid: Pid) -> Result<String> {
        let stat_path = self.proc_root.join(pid.0.to_string()).join("stat");
        let stat = fs::read_to_string(&stat_path)
            .with_context(|| format!("Cannot read {}", stat_path.display()))?;
        extract_comm(&stat)
    }
}

impl Default for ProcfsNames {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessNames for ProcfsNames {
    fn name_of(&self, pid: Pid) -> Option<String> {
        self.read_comm(pid).ok()
    }
}

/// Fixed PID → name table
impl ProcessNames for HashMap<u32, String> {
    fn name_of(&self, pid: Pid) -> Option<String> {
        self.get(&pid.0).cloned()
    }
}

/// Extract command name from `/proc/<pid>/stat`.
/// Format: "pid (comm) state ..."
fn extract_comm(stat_line: &str) -> Result<String> {
    let open = stat_line.find('(').context("Invalid stat format")?;
    let close = stat_line.rfind(')').context("Invalid stat format")?;
    if open >= close {
        bail!("Invalid stat format");
    }
    Ok(stat_line[open + 1..close].to_string())
}
