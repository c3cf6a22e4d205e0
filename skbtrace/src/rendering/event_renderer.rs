//! # Event Rendering
//!
//! Turns one probe event into one trace record.
//!
//! ## Per-Event Steps
//!
//! 1. Correct the raw address for arch and attachment
//! 2. Resolve the function name (exact → CFI pad → hex)
//! 3. Resolve the process name (placeholder if gone)
//! 4. Compute the timestamp column and update the flow clock
//! 5. Write fixed columns, then the optional meta / tuple sections
//! 6. Consume stack and `sk_buff` dump entries into continuation lines
//!
//! Lookup misses never fail a record. Only writing to the sink can fail.

use serde::Serialize;
use skbtrace_common::SkbEvent;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Write;

use super::side_tables::{expand_buffer, expand_stack, BufferDump, SideTable, StackSnapshot};
use super::tuple::{addr_to_string, format_meta, format_tuple, l4_proto_name};
use super::{FlowClock, RenderOptions, TimestampMode};
use crate::domain::{FlowKey, Pid, RenderError, SkbDumpId, StackId};
use crate::process_lookup::ProcessNames;
use crate::symbolization::{Arch, Attachment, KernelSymbols};

/// Renders events to a sink, one record at a time
///
/// Owns the flow clock and the sink, so a single renderer must not be
/// shared between concurrent event readers.
pub struct EventRenderer<'a, W: Write> {
    options: RenderOptions,
    arch: Arch,
    attachment: Attachment,
    symbols: &'a KernelSymbols,
    names: &'a dyn ProcessNames,
    clock: FlowClock,
    sink: W,
}

impl<'a, W: Write> EventRenderer<'a, W> {
    #[must_use]
    pub fn new(
        options: RenderOptions,
        arch: Arch,
        attachment: Attachment,
        symbols: &'a KernelSymbols,
        names: &'a dyn ProcessNames,
        sink: W,
    ) -> Self {
        Self { options, arch, attachment, symbols, names, clock: FlowClock::new(), sink }
    }

    /// Column header line (nothing in JSON mode)
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written
    pub fn write_header(&mut self) -> Result<(), RenderError> {
        if self.options.json {
            return Ok(());
        }

        let mut header = format!("{:>18} {:>6} {:>16} {:>24}", "SKB", "CPU", "PROCESS", "FUNC");
        if self.options.timestamp != TimestampMode::None {
            let _ = write!(header, " {:>16}", "TIMESTAMP");
        }
        header.push('\n');

        self.emit(&header)
    }

    /// Render one event, consuming its side-table entries
    ///
    /// # Errors
    /// Returns an error if the sink cannot be written
    pub fn render<S, B>(
        &mut self,
        event: &SkbEvent,
        stacks: &mut S,
        buffers: &mut B,
    ) -> Result<(), RenderError>
    where
        S: SideTable<Entry = StackSnapshot> + ?Sized,
        B: SideTable<Entry = BufferDump> + ?Sized,
    {
        let symbols = self.symbols;
        let addr = self.arch.normalize(event.addr, self.attachment);
        let func = symbols.function_name(self.arch, addr);
        let process = self.names.name_or_placeholder(Pid(event.pid));
        let flow = FlowKey(event.skb_addr);
        let timestamp = self.clock.observe(self.options.timestamp, flow, event.timestamp);

        let stack = if self.options.stack {
            expand_stack(stacks, StackId(event.print_stack_id), symbols)
        } else {
            Vec::new()
        };

        let skb_dump = if self.options.skb {
            expand_buffer(buffers, SkbDumpId(event.print_skb_id))
        } else {
            None
        };

        let record = Record { event, flow, process, func, timestamp, stack, skb_dump };

        let text = if self.options.json {
            let mut line = serde_json::to_string(&record.to_json(&self.options))?;
            line.push('\n');
            line
        } else {
            record.to_text(&self.options)
        };

        self.emit(&text)
    }

    /// Number of distinct skbs seen
    #[must_use]
    pub fn flows_seen(&self) -> usize {
        self.clock.len()
    }

    /// Give back the sink (tests read rendered output from it)
    pub fn into_sink(self) -> W {
        self.sink
    }

    fn emit(&mut self, text: &str) -> Result<(), RenderError> {
        self.sink.write_all(text.as_bytes())?;
        self.sink.flush()?;
        Ok(())
    }
}

/// Everything resolved for one event
struct Record<'e, 's> {
    event: &'e SkbEvent,
    flow: FlowKey,
    process: String,
    func: Cow<'s, str>,
    timestamp: Option<u64>,
    stack: Vec<String>,
    skb_dump: Option<String>,
}

impl Record<'_, '_> {
    fn to_text(&self, options: &RenderOptions) -> String {
        let mut line = format!(
            "{:>18} {:>6} {:>16} {:>24}",
            self.flow.to_string(),
            self.event.cpu,
            format!("[{}]", self.process),
            self.func
        );

        if let Some(ts) = self.timestamp {
            let _ = write!(line, " {ts:>16}");
        }

        if options.meta {
            let _ = write!(line, " {}", format_meta(&self.event.meta));
        }

        if options.tuple {
            let _ = write!(line, " {}", format_tuple(&self.event.tuple));
        }

        for frame in &self.stack {
            let _ = write!(line, "\n\t{frame}");
        }

        if let Some(ref dump) = self.skb_dump {
            for dump_line in dump.lines() {
                let _ = write!(line, "\n\t{dump_line}");
            }
        }

        line.push('\n');
        line
    }

    fn to_json(&self, options: &RenderOptions) -> JsonRecord<'_> {
        let meta = &self.event.meta;
        let tuple = &self.event.tuple;

        JsonRecord {
            skb: self.flow.to_string(),
            cpu: self.event.cpu,
            process: &self.process,
            func: &self.func,
            timestamp: self.timestamp,
            meta: options.meta.then_some(JsonMeta {
                netns: meta.netns,
                mark: meta.mark,
                ifindex: meta.ifindex,
                proto: meta.proto,
                mtu: meta.mtu,
                len: meta.len,
            }),
            tuple: options.tuple.then(|| JsonTuple {
                saddr: addr_to_string(tuple.l3_proto, &tuple.saddr),
                sport: u16::from_be(tuple.sport),
                daddr: addr_to_string(tuple.l3_proto, &tuple.daddr),
                dport: u16::from_be(tuple.dport),
                proto: l4_proto_name(tuple.l4_proto),
            }),
            stack: (options.stack && !self.stack.is_empty()).then_some(&self.stack),
            skb_dump: self.skb_dump.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct JsonRecord<'r> {
    skb: String,
    cpu: u32,
    process: &'r str,
    func: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<JsonMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tuple: Option<JsonTuple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<&'r Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skb_dump: Option<&'r str>,
}

#[derive(Serialize)]
struct JsonMeta {
    netns: u32,
    mark: u32,
    ifindex: u32,
    proto: u16,
    mtu: u32,
    len: u32,
}

#[derive(Serialize)]
struct JsonTuple {
    saddr: String,
    sport: u16,
    daddr: String,
    dport: u16,
    proto: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::InMemoryTable;
    use std::collections::HashMap;

    fn symbols() -> KernelSymbols {
        [(0xffff_ffff_8100_1000, "ip_rcv".to_string())].into_iter().collect()
    }

    fn render_one(options: RenderOptions, event: &SkbEvent) -> String {
        let symbols = symbols();
        let names: HashMap<u32, String> = [(42, "ping".to_string())].into_iter().collect();
        let mut renderer = EventRenderer::new(
            options,
            Arch::Amd64,
            Attachment::BulkProbe,
            &symbols,
            &names,
            Vec::new(),
        );
        let mut stacks: InMemoryTable<StackSnapshot> = InMemoryTable::new();
        let mut buffers: InMemoryTable<BufferDump> = InMemoryTable::new();
        renderer.render(event, &mut stacks, &mut buffers).unwrap();
        String::from_utf8(renderer.into_sink()).unwrap()
    }

    fn event() -> SkbEvent {
        SkbEvent {
            pid: 42,
            addr: 0xffff_ffff_8100_1000,
            skb_addr: 0xffff_8880_0abc_d000,
            timestamp: 1_000,
            cpu: 3,
            ..SkbEvent::default()
        }
    }

    #[test]
    fn test_header_without_timestamp() {
        let symbols = symbols();
        let names: HashMap<u32, String> = HashMap::new();
        let mut renderer = EventRenderer::new(
            RenderOptions::default(),
            Arch::Amd64,
            Attachment::BulkProbe,
            &symbols,
            &names,
            Vec::new(),
        );
        renderer.write_header().unwrap();

        let out = String::from_utf8(renderer.into_sink()).unwrap();
        assert_eq!(
            out,
            "               SKB    CPU          PROCESS                     FUNC\n"
        );
    }

    #[test]
    fn test_header_with_timestamp() {
        let symbols = symbols();
        let names: HashMap<u32, String> = HashMap::new();
        let options = RenderOptions { timestamp: TimestampMode::Absolute, ..Default::default() };
        let mut renderer = EventRenderer::new(
            options,
            Arch::Amd64,
            Attachment::BulkProbe,
            &symbols,
            &names,
            Vec::new(),
        );
        renderer.write_header().unwrap();

        let out = String::from_utf8(renderer.into_sink()).unwrap();
        assert!(out.ends_with("FUNC        TIMESTAMP\n"));
    }

    #[test]
    fn test_record_columns() {
        let out = render_one(RenderOptions::default(), &event());
        assert_eq!(
            out,
            "0xffff88800abcd000      3           [ping]                   ip_rcv\n"
        );
    }

    #[test]
    fn test_record_with_absolute_timestamp() {
        let options = RenderOptions { timestamp: TimestampMode::Absolute, ..Default::default() };
        let out = render_one(options, &event());
        assert!(out.ends_with("ip_rcv             1000\n"), "got {out:?}");
    }

    #[test]
    fn test_record_unknown_process_and_function() {
        let mut ev = event();
        ev.pid = 9999;
        ev.addr = 0x1234;
        let out = render_one(RenderOptions::default(), &ev);
        assert!(out.contains("[<empty>]"));
        assert!(out.trim_end().ends_with("0x1234"));
    }

    #[test]
    fn test_record_meta_and_tuple_sections() {
        let mut ev = event();
        ev.meta.ifindex = 2;
        ev.meta.len = 84;
        ev.tuple.l3_proto = skbtrace_common::ETH_P_IP;
        ev.tuple.saddr[..4].copy_from_slice(&[10, 0, 0, 1]);
        ev.tuple.daddr[..4].copy_from_slice(&[10, 0, 0, 2]);
        ev.tuple.l4_proto = skbtrace_common::IPPROTO_ICMP;

        let options = RenderOptions { meta: true, tuple: true, ..Default::default() };
        let out = render_one(options, &ev);
        assert!(out.contains(
            " netns=0 mark=0x0 ifindex=2 proto=0 mtu=0 len=84 10.0.0.1:0->10.0.0.2:0(icmp)\n"
        ));
    }

    #[test]
    fn test_json_record() {
        let options = RenderOptions {
            timestamp: TimestampMode::Relative,
            tuple: true,
            json: true,
            ..Default::default()
        };
        let out = render_one(options, &event());
        let parsed: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();

        assert_eq!(parsed["skb"], "0xffff88800abcd000");
        assert_eq!(parsed["cpu"], 3);
        assert_eq!(parsed["process"], "ping");
        assert_eq!(parsed["func"], "ip_rcv");
        assert_eq!(parsed["timestamp"], 0);
        assert_eq!(parsed["tuple"]["proto"], "");
        assert!(parsed.get("meta").is_none());
        assert!(parsed.get("stack").is_none());
    }
}
