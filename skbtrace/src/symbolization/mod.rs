//! # Kernel Symbol Resolution
//!
//! Converts the raw instruction pointers reported by the probes into kernel
//! function names.
//!
//! ## Address Translation Flow
//!
//! ```text
//! 1. Probe reports raw address
//!    x86-64, single kprobe: 0xffffffff81c2a105
//!
//! 2. Correct for attachment mechanism (arch::Arch::normalize)
//!    single kprobe reports entry + 1  ->  0xffffffff81c2a104
//!
//! 3. Exact lookup in kallsyms                    miss
//!
//! 4. IBT kernels: retry at address - 4 (endbr64)
//!    0xffffffff81c2a100 -> ip_rcv_core           hit
//!
//! 5. Nothing matched: print the address as hex
//! ```
//!
//! Stack frames are return addresses somewhere inside a function, so they use
//! a nearest-below lookup instead of steps 3–4.
//!
//! ## Module Structure
//!
//! - **`arch`**: per-architecture address correction, selected once at startup
//! - **`kallsyms`**: symbol table parsed from `/proc/kallsyms`
//!
//! ## Limitations
//!
//! - **kptr_restrict**: unprivileged readers see all-zero addresses; every
//!   function then renders as hex
//! - **Modules loaded later**: the table is a snapshot taken at startup

pub mod arch;
pub mod kallsyms;

pub use arch::{Arch, Attachment};
pub use kallsyms::{demangle_symbol, KernelSymbols};
