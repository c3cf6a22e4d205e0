//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep the many integer fields of a probe event apart:
//! a flow key is not a PID, and a stack id is not a dump id.

use std::fmt;

/// Flow key
///
/// The `sk_buff` address. Stable for one buffer across every function it
/// passes through, so it identifies the "flow" a trace line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey(pub u64);

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Process ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

/// Key into the stack side table
///
/// The probe stores the return value of `bpf_get_stackid()`, so negative
/// values are errors. Zero means "no snapshot requested".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackId(pub i64);

impl StackId {
    /// Map key, or `None` when no snapshot was stored
    pub fn as_map_key(self) -> Option<u32> {
        if self.0 > 0 {
            u32::try_from(self.0).ok()
        } else {
            None
        }
    }
}

/// Key into the `sk_buff` dump side table (0 = no dump)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkbDumpId(pub u64);

impl SkbDumpId {
    /// Map key, or `None` when no dump was stored
    pub fn as_map_key(self) -> Option<u32> {
        if self.0 > 0 {
            u32::try_from(self.0).ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_key_display() {
        assert_eq!(FlowKey(0xffff_8880_0abc_d000).to_string(), "0xffff88800abcd000");
        assert_eq!(FlowKey(0xAB).to_string(), "0xab");
    }

    #[test]
    fn test_stack_id_map_key() {
        assert_eq!(StackId(7).as_map_key(), Some(7));
        assert_eq!(StackId(0).as_map_key(), None);
        assert_eq!(StackId(-14).as_map_key(), None);
        assert_eq!(StackId(i64::MAX).as_map_key(), None);
    }

    #[test]
    fn test_dump_id_map_key() {
        assert_eq!(SkbDumpId(3).as_map_key(), Some(3));
        assert_eq!(SkbDumpId(0).as_map_key(), None);
    }
}
