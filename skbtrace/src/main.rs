//! # skbtrace - Main Entry Point
//!
//! Opens the maps pinned by the probe loader, loads kernel symbols, and
//! renders every event from the ring buffer until Ctrl+C or `--duration`.

#![allow(clippy::too_many_lines)]

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::time::{Duration, Instant};

use skbtrace::capture::{EventProcessor, PinnedMaps};
use skbtrace::cli::Args;
use skbtrace::preflight::run_preflight_checks;
use skbtrace::process_lookup::ProcfsNames;
use skbtrace::rendering::{open_sink, EventRenderer};
use skbtrace::symbolization::{Arch, Attachment, KernelSymbols};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let arch = Arch::host()?;
    let attachment = Attachment::from_kprobe_multi(args.kprobe_multi);

    run_preflight_checks(&args.pin_path, &args.kallsyms)?;

    let sink = open_sink(args.output_file.as_deref())?;

    let symbols = KernelSymbols::load(&args.kallsyms, args.demangle)
        .context("Failed to load kernel symbols")?;
    let names = ProcfsNames::new();

    let PinnedMaps { mut events, stacks, buffers } =
        PinnedMaps::open(&args.pin_path).context("Failed to open pinned maps")?;

    if !quiet {
        eprintln!("skbtrace v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("symbols: {}", symbols.len());
        eprintln!("attachment: {}", if args.kprobe_multi { "kprobe-multi" } else { "kprobe" });
    }
    info!("Architecture {arch:?}, attachment {attachment:?}");

    let renderer =
        EventRenderer::new(args.render_options(), arch, attachment, &symbols, &names, sink);
    let mut processor = EventProcessor::new(renderer, stacks, buffers);
    processor.start().context("Failed to write header")?;

    // Setup Ctrl+C handler
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // Track start time for duration limit
    let started = Instant::now();
    let duration_limit =
        if args.duration > 0 { Some(Duration::from_secs(args.duration)) } else { None };
    let mut last_status_time = Instant::now();

    // Track why we exited the loop
    let mut exit_reason = "interrupted";

    // Main event processing loop
    loop {
        if let Some(limit) = duration_limit {
            if started.elapsed() >= limit {
                exit_reason = "duration limit reached";
                break;
            }
        }

        if processor.event_count == 0 && last_status_time.elapsed() > Duration::from_secs(10) {
            info!("Still waiting for events... (are the probes attached?)");
            last_status_time = Instant::now();
        }

        // Drain everything the probes produced since the last pass
        while let Some(item) = events.next() {
            processor.process_record(&item).context("Failed to write trace output")?;
        }

        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(100)) => {}
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    if !quiet {
        eprintln!(
            "\n{}: {:.1}s, {} events, {} skbs, {} short records",
            exit_reason,
            started.elapsed().as_secs_f64(),
            processor.event_count,
            processor.flows_seen(),
            processor.short_records,
        );
    }

    Ok(())
}
