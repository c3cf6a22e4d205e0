//! Architecture-specific instruction pointer correction
//!
//! The address a probe reports is not always the entry of the function it
//! fired in. How far off it is depends on the CPU and on how the probe was
//! attached, so the rules live here as a closed set of variants chosen once at
//! startup.

use crate::domain::SetupError;

/// CPU architecture the traced kernel runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    /// x86-64
    Amd64,
    /// AArch64
    Arm64,
}

/// How the probes were attached to the traced functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// One classic kprobe per function
    SingleProbe,
    /// kprobe-multi (one link for many functions)
    BulkProbe,
}

impl Attachment {
    #[must_use]
    pub fn from_kprobe_multi(kprobe_multi: bool) -> Self {
        if kprobe_multi {
            Self::BulkProbe
        } else {
            Self::SingleProbe
        }
    }
}

/// Size of `endbr64`, emitted ahead of the symbol address on IBT kernels
const ENDBR_LEN: u64 = 4;

impl Arch {
    /// Architecture this binary was built for
    ///
    /// # Errors
    /// Returns [`SetupError::UnsupportedArch`] on anything but x86-64 and AArch64
    pub fn host() -> Result<Self, SetupError> {
        match std::env::consts::ARCH {
            "x86_64" => Ok(Self::Amd64),
            "aarch64" => Ok(Self::Arm64),
            other => Err(SetupError::UnsupportedArch(other)),
        }
    }

    /// Correct a raw probe address before symbol lookup
    ///
    /// On x86-64 a single kprobe reports the address after the breakpoint
    /// (entry + 1); kprobe-multi reports the entry itself. AArch64 reports the
    /// entry either way.
    #[must_use]
    pub fn normalize(self, raw: u64, attachment: Attachment) -> u64 {
        match (self, attachment) {
            (Self::Amd64, Attachment::SingleProbe) => raw.wrapping_sub(1),
            (Self::Amd64, Attachment::BulkProbe) | (Self::Arm64, _) => raw,
        }
    }

    /// Offset of the CFI landing pad in front of the function entry, if any
    ///
    /// With `CONFIG_X86_KERNEL_IBT` the probe fires after `endbr64`, 4 bytes
    /// past the address kallsyms lists.
    #[must_use]
    pub fn cfi_prologue(self) -> Option<u64> {
        match self {
            Self::Amd64 => Some(ENDBR_LEN),
            Self::Arm64 => None,
        }
    }
}
