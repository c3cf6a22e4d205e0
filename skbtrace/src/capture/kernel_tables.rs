//! [`SideTable`] implementations over the kernel side maps

use aya::maps::{HashMap, MapData, StackTraceMap};
use log::debug;
use skbtrace_common::PRINT_SKB_STR_SIZE;
use std::borrow::{Borrow, BorrowMut};

use crate::rendering::{BufferDump, SideTable, StackSnapshot};

/// `print_stack_map`: `BPF_MAP_TYPE_STACK_TRACE` keyed by stack id
pub struct KernelStackTable<T> {
    map: StackTraceMap<T>,
}

impl<T: Borrow<MapData>> KernelStackTable<T> {
    pub fn new(map: StackTraceMap<T>) -> Self {
        Self { map }
    }
}

impl<T: BorrowMut<MapData>> SideTable for KernelStackTable<T> {
    type Entry = StackSnapshot;

    fn fetch_and_delete(&mut self, id: u32) -> Option<StackSnapshot> {
        // Missing entry: already consumed, or the probe failed to store it
        let trace = self.map.get(&id, 0).ok()?;
        let ips = trace.frames().iter().map(|frame| frame.ip).collect();

        if let Err(e) = self.map.remove(&id) {
            debug!("Failed to release stack entry {id}: {e}");
        }

        Some(StackSnapshot::new(ips))
    }
}

/// `print_skb_map`: `BPF_MAP_TYPE_HASH` of `u32 → [u8; PRINT_SKB_STR_SIZE]`
pub struct KernelBufferTable<T> {
    map: HashMap<T, u32, [u8; PRINT_SKB_STR_SIZE]>,
}

impl<T: Borrow<MapData>> KernelBufferTable<T> {
    pub fn new(map: HashMap<T, u32, [u8; PRINT_SKB_STR_SIZE]>) -> Self {
        Self { map }
    }
}

impl<T: BorrowMut<MapData>> SideTable for KernelBufferTable<T> {
    type Entry = BufferDump;

    fn fetch_and_delete(&mut self, id: u32) -> Option<BufferDump> {
        let bytes = self.map.get(&id, 0).ok()?;

        if let Err(e) = self.map.remove(&id) {
            debug!("Failed to release skb dump entry {id}: {e}");
        }

        Some(BufferDump::new(bytes.to_vec()))
    }
}
