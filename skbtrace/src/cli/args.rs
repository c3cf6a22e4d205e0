//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::rendering::{RenderOptions, TimestampMode};

#[derive(Parser, Debug)]
#[command(
    name = "skbtrace",
    about = "Print the kernel functions each network packet passes through",
    after_help = "\
EXAMPLES:
    sudo skbtrace                                     Trace with default pins
    sudo skbtrace --output-ts relative --output-tuple  Per-skb timing and endpoints
    sudo skbtrace --kprobe-multi --output-stack        Probes attached with kprobe-multi"
)]
pub struct Args {
    /// Timestamp column: none, absolute, or relative to the skb's previous event
    #[arg(long, value_enum, default_value_t = TimestampMode::None)]
    pub output_ts: TimestampMode,

    /// Print skb metadata (netns, mark, ifindex, proto, mtu, len)
    #[arg(long)]
    pub output_meta: bool,

    /// Print L3/L4 endpoints
    #[arg(long)]
    pub output_tuple: bool,

    /// Print the kernel call stack of each event
    #[arg(long)]
    pub output_stack: bool,

    /// Print the sk_buff dump of each event
    #[arg(long)]
    pub output_skb: bool,

    /// Emit one JSON object per event instead of columns
    #[arg(long)]
    pub output_json: bool,

    /// Write trace output to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Probes were attached with kprobe-multi
    #[arg(long)]
    pub kprobe_multi: bool,

    /// bpffs directory holding the pinned maps
    #[arg(long, value_name = "DIR", default_value = "/sys/fs/bpf/skbtrace")]
    pub pin_path: PathBuf,

    /// Kernel symbol table
    #[arg(long, value_name = "FILE", default_value = "/proc/kallsyms")]
    pub kallsyms: PathBuf,

    /// Demangle Rust kernel symbol names
    #[arg(long)]
    pub demangle: bool,

    /// Stop after N seconds (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Output options for the renderer
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            timestamp: self.output_ts,
            meta: self.output_meta,
            tuple: self.output_tuple,
            stack: self.output_stack,
            skb: self.output_skb,
            json: self.output_json,
        }
    }
}
