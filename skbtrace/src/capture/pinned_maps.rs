//! Maps pinned by the external probe loader

use aya::maps::{HashMap, Map, MapData, RingBuf, StackTraceMap};
use log::info;
use skbtrace_common::{EVENTS_MAP, PRINT_SKB_MAP, PRINT_STACK_MAP};
use std::path::Path;

use super::kernel_tables::{KernelBufferTable, KernelStackTable};
use crate::domain::SetupError;

/// The event ring buffer and both side tables
pub struct PinnedMaps {
    pub events: RingBuf<MapData>,
    pub stacks: KernelStackTable<MapData>,
    pub buffers: KernelBufferTable<MapData>,
}

impl PinnedMaps {
    /// Open `events`, `print_stack_map` and `print_skb_map` under `pin_dir`
    ///
    /// # Errors
    /// Returns an error if a map is missing or has the wrong type
    pub fn open(pin_dir: &Path) -> Result<Self, SetupError> {
        let events = RingBuf::try_from(Map::RingBuf(open_pinned(pin_dir, EVENTS_MAP)?))?;
        let stacks =
            StackTraceMap::try_from(Map::StackTraceMap(open_pinned(pin_dir, PRINT_STACK_MAP)?))?;
        let buffers = HashMap::try_from(Map::HashMap(open_pinned(pin_dir, PRINT_SKB_MAP)?))?;

        info!("Opened pinned maps in {}", pin_dir.display());

        Ok(Self {
            events,
            stacks: KernelStackTable::new(stacks),
            buffers: KernelBufferTable::new(buffers),
        })
    }
}

fn open_pinned(pin_dir: &Path, name: &str) -> Result<MapData, SetupError> {
    let path = pin_dir.join(name);
    MapData::from_pin(&path)
        .map_err(|e| SetupError::PinnedMapOpenFailed { path, error: e.to_string() })
}
