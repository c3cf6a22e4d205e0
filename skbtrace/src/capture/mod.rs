//! Event source plumbing
//!
//! The probes are loaded and attached by an external loader, which pins its
//! maps on bpffs. This module opens those pins and feeds ring-buffer records
//! into the rendering pipeline:
//! - `pinned_maps`: open `events`, `print_stack_map`, `print_skb_map`
//! - `kernel_tables`: `SideTable` over the two side maps
//! - `event_processor`: decode records and drive the renderer

pub mod event_processor;
pub mod kernel_tables;
pub mod pinned_maps;

pub use event_processor::{decode_event, EventProcessor};
pub use kernel_tables::{KernelBufferTable, KernelStackTable};
pub use pinned_maps::PinnedMaps;
