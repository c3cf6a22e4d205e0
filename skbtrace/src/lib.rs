//! # skbtrace - Per-Packet Kernel Function Tracer
//!
//! skbtrace prints, for every network packet (`sk_buff`), the sequence of
//! kernel functions that handled it. It is meant for finding where a packet
//! gets dropped or rerouted inside a running kernel.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Probe loader (external, pins maps)                 │
//! │   kprobes / kprobe-multi on every function taking an sk_buff    │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ events ring buffer + side tables
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    skbtrace (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │   Capture    │──▶│    Event     │──▶│    Output    │         │
//! │  │ (pinned maps)│   │   Renderer   │   │ (stdout/file)│         │
//! │  └──────────────┘   └──────┬───────┘   └──────────────┘         │
//! │                            │                                    │
//! │        ┌───────────────────┼───────────────────┐                │
//! │        ▼                   ▼                   ▼                │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │ Symbolization│   │   Process    │   │  Side tables │         │
//! │  │  (kallsyms)  │   │    lookup    │   │ (stack, skb) │         │
//! │  └──────────────┘   └──────────────┘   └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`capture`]: open the pinned maps, decode ring-buffer records
//! - [`rendering`]: turn one event into one trace record
//!   - `flow_clock`: per-skb relative timestamps
//!   - `side_tables`: read-once stack and `sk_buff` dump entries
//!   - `tuple`: metadata and L3/L4 endpoint text
//! - [`symbolization`]: kallsyms table and per-arch address correction
//! - [`process_lookup`]: PID → process name
//! - [`cli`]: command-line arguments
//! - [`domain`]: newtypes and error types
//!
//! ## Output Format
//!
//! ```text
//!                SKB    CPU          PROCESS                     FUNC        TIMESTAMP
//! 0xffff88810b3c2e00      2           [ping]                 ip_output                0
//! 0xffff88810b3c2e00      2           [ping]            ip_finish_output             2112
//! ```
//!
//! Each record may be followed by tab-indented continuation lines: one per
//! stack frame, then the `sk_buff` dump.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Probes already attached and pinned under /sys/fs/bpf/skbtrace
//! sudo ./skbtrace --output-ts relative --output-tuple
//!
//! # Probes attached with kprobe-multi, write to a file
//! sudo ./skbtrace --kprobe-multi --output-stack --output-file trace.txt
//! ```

pub mod capture;
pub mod cli;
pub mod domain;
pub mod preflight;
pub mod process_lookup;
pub mod rendering;
pub mod symbolization;
