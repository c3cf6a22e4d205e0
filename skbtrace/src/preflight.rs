//! Pre-flight checks for skbtrace
//!
//! Validates system requirements before opening the pinned maps.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Run all pre-flight checks
///
/// # Errors
/// Returns an error describing the first requirement that is not met
pub fn run_preflight_checks(pin_dir: &Path, kallsyms: &Path) -> Result<()> {
    check_privileges()?;
    check_pin_dir(pin_dir)?;
    check_kallsyms(kallsyms)?;
    Ok(())
}

/// Check if running with sufficient privileges to open pinned BPF maps
fn check_privileges() -> Result<()> {
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    bail!(
        "Permission denied: skbtrace requires root privileges to read BPF maps.\n\n\
         Run with: sudo skbtrace ..."
    );
}

/// Check that the loader has pinned its maps
fn check_pin_dir(pin_dir: &Path) -> Result<()> {
    if !pin_dir.is_dir() {
        bail!(
            "Pin directory not found: {}\n\n\
             Load and attach the probes first; the loader pins its maps there.\n\
             Use --pin-path to point at a different bpffs directory.",
            pin_dir.display()
        );
    }
    Ok(())
}

/// Check that the kernel symbol table is readable
fn check_kallsyms(kallsyms: &Path) -> Result<()> {
    std::fs::File::open(kallsyms).with_context(|| {
        format!(
            "Cannot read {}\n\n\
             Kernel symbols are needed to name traced functions.",
            kallsyms.display()
        )
    })?;
    Ok(())
}
