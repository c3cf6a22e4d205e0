//! Output options shared by the CLI and the renderer

use clap::ValueEnum;

/// What goes into the TIMESTAMP column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimestampMode {
    /// No TIMESTAMP column
    #[default]
    None,
    /// Raw `bpf_ktime_get_ns()` value
    Absolute,
    /// Nanoseconds since the previous event of the same skb (0 for the first)
    Relative,
}

/// Which optional sections each record carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub timestamp: TimestampMode,
    /// netns / mark / ifindex / proto / mtu / len
    pub meta: bool,
    /// `saddr:sport->daddr:dport(proto)`
    pub tuple: bool,
    /// Kernel call stack, one continuation line per frame
    pub stack: bool,
    /// `sk_buff` dump text
    pub skb: bool,
    /// One JSON object per event instead of columns
    pub json: bool,
}
