//! # Event Processing
//!
//! Consumes raw records from the `events` ring buffer, decodes them, and
//! hands each event to the [`EventRenderer`] together with the side tables.
//!
//! Records shorter than [`SkbEvent`] are counted and skipped. A sink write
//! failure is the only error that leaves this module.

use log::warn;
use skbtrace_common::SkbEvent;
use std::io::Write;

use crate::domain::RenderError;
use crate::rendering::{BufferDump, EventRenderer, SideTable, StackSnapshot};

/// Decode one ring-buffer record
///
/// Returns `None` if the record is too short to hold an [`SkbEvent`].
#[must_use]
pub fn decode_event(bytes: &[u8]) -> Option<SkbEvent> {
    if bytes.len() < std::mem::size_of::<SkbEvent>() {
        return None;
    }

    // SAFETY: length checked above; SkbEvent is repr(C) plain data written by the probe
    #[allow(unsafe_code)]
    let event = unsafe { std::ptr::read_unaligned(bytes.as_ptr().cast::<SkbEvent>()) };
    Some(event)
}

/// Encapsulates decoding, rendering, and counters for one event stream
pub struct EventProcessor<'a, W: Write, S, B> {
    renderer: EventRenderer<'a, W>,
    stacks: S,
    buffers: B,

    pub event_count: usize,
    /// Records too short to decode
    pub short_records: usize,
}

impl<'a, W, S, B> EventProcessor<'a, W, S, B>
where
    W: Write,
    S: SideTable<Entry = StackSnapshot>,
    B: SideTable<Entry = BufferDump>,
{
    #[must_use]
    pub fn new(renderer: EventRenderer<'a, W>, stacks: S, buffers: B) -> Self {
        Self { renderer, stacks, buffers, event_count: 0, short_records: 0 }
    }

    /// Write the column header
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written
    pub fn start(&mut self) -> Result<(), RenderError> {
        self.renderer.write_header()
    }

    /// Decode and render one raw ring-buffer record
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written
    pub fn process_record(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        let Some(event) = decode_event(bytes) else {
            self.short_records += 1;
            warn!(
                "Received incomplete event ({} bytes, expected {})",
                bytes.len(),
                std::mem::size_of::<SkbEvent>()
            );
            return Ok(());
        };

        self.process_event(&event)
    }

    /// Render one decoded event
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written
    pub fn process_event(&mut self, event: &SkbEvent) -> Result<(), RenderError> {
        self.event_count += 1;
        self.renderer.render(event, &mut self.stacks, &mut self.buffers)
    }

    /// Number of distinct skbs seen
    #[must_use]
    pub fn flows_seen(&self) -> usize {
        self.renderer.flows_seen()
    }

    /// Give back the side tables and sink
    pub fn into_parts(self) -> (W, S, B) {
        (self.renderer.into_sink(), self.stacks, self.buffers)
    }
}
