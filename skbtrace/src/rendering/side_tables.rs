//! Stack and `sk_buff` dump side tables
//!
//! The probes store a call stack or a text dump under a small integer id and
//! put the id in the event. Ids are reused, so userspace reads each entry once
//! and deletes it. The [`SideTable`] trait exposes only that combined
//! operation.
//!
//! A read can race with the probe reusing the id. The outcome is a newer
//! snapshot or no snapshot, and either renders fine.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::domain::{SkbDumpId, StackId};
use crate::symbolization::KernelSymbols;

/// Table of ephemeral entries keyed by small ids
pub trait SideTable {
    type Entry;

    /// Read the entry stored under `id` and release its slot
    ///
    /// Returns `None` when nothing is stored under `id`, including when it was
    /// already consumed. A failed delete after a successful read still returns
    /// the entry.
    fn fetch_and_delete(&mut self, id: u32) -> Option<Self::Entry>;
}

/// Kernel call stack captured at an instrumentation hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSnapshot {
    ips: Vec<u64>,
}

impl StackSnapshot {
    #[must_use]
    pub fn new(ips: Vec<u64>) -> Self {
        Self { ips }
    }

    /// Non-zero addresses, innermost first
    pub fn frames(&self) -> impl Iterator<Item = u64> + '_ {
        self.ips.iter().copied().filter(|&ip| ip != 0)
    }
}

/// `sk_buff` dump text produced by the probe (NUL padded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDump {
    bytes: Vec<u8>,
}

impl BufferDump {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Text up to the first NUL
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(self.bytes.len());
        String::from_utf8_lossy(&self.bytes[..end])
    }
}

/// Side table held in process memory
///
/// Used when replaying captured entries and in tests.
#[derive(Debug, Clone)]
pub struct InMemoryTable<E> {
    entries: HashMap<u32, E>,
}

impl<E> InMemoryTable<E> {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn insert(&mut self, id: u32, entry: E) {
        self.entries.insert(id, entry);
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for InMemoryTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SideTable for InMemoryTable<E> {
    type Entry = E;

    fn fetch_and_delete(&mut self, id: u32) -> Option<E> {
        self.entries.remove(&id)
    }
}

/// Consume the stack stored under `id` and name each frame
///
/// Empty when the event carries no stack or the entry is gone.
pub fn expand_stack<T>(table: &mut T, id: StackId, symbols: &KernelSymbols) -> Vec<String>
where
    T: SideTable<Entry = StackSnapshot> + ?Sized,
{
    let Some(key) = id.as_map_key() else {
        return Vec::new();
    };

    table.fetch_and_delete(key).map_or_else(Vec::new, |snapshot| {
        snapshot.frames().map(|ip| symbols.frame_name(ip).into_owned()).collect()
    })
}

/// Consume the `sk_buff` dump stored under `id`
pub fn expand_buffer<T>(table: &mut T, id: SkbDumpId) -> Option<String>
where
    T: SideTable<Entry = BufferDump> + ?Sized,
{
    let key = id.as_map_key()?;
    table.fetch_and_delete(key).map(|dump| dump.text().into_owned())
}
