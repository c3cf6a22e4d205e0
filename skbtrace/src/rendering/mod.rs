//! Rendering pipeline
//!
//! Everything between a decoded probe event and a line of trace output:
//! - Output options (which columns and sections are enabled)
//! - Per-skb timestamp state
//! - One-shot consumption of the stack and `sk_buff` dump side tables
//! - Metadata and 4-tuple text
//! - Record assembly and the output sink

pub mod event_renderer;
pub mod flow_clock;
pub mod options;
pub mod output;
pub mod side_tables;
pub mod tuple;

pub use event_renderer::EventRenderer;
pub use flow_clock::FlowClock;
pub use options::{RenderOptions, TimestampMode};
pub use output::open_sink;
pub use side_tables::{
    expand_buffer, expand_stack, BufferDump, InMemoryTable, SideTable, StackSnapshot,
};
pub use tuple::{addr_to_string, format_meta, format_tuple, l4_proto_name};
