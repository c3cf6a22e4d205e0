//! # Shared Data Structures (eBPF ↔ Userspace)
//!
//! Defines the records and constants shared between the kernel-side probe
//! programs and the userspace renderer. All types use `#[repr(C)]` so the
//! layout matches what the probes write into the ring buffer.
//!
//! ## Maps
//!
//! The external loader pins three maps under one directory:
//!
//! 1. [`EVENTS_MAP`] - ring buffer of [`SkbEvent`] records
//! 2. [`PRINT_STACK_MAP`] - stack-trace map, one snapshot per [`SkbEvent::print_stack_id`]
//! 3. [`PRINT_SKB_MAP`] - hash map `u32 → [u8; PRINT_SKB_STR_SIZE]`, one
//!    rendered `sk_buff` dump per [`SkbEvent::print_skb_id`]
//!
//! Entries in the two side maps are ephemeral: the probe reuses small ids, and
//! userspace deletes an entry once it has read it.

#![cfg_attr(not(test), no_std)]

// ============================================================================
// Map Names
// ============================================================================

/// Pin name of the event ring buffer
pub const EVENTS_MAP: &str = "events";

/// Pin name of the call-stack side table
pub const PRINT_STACK_MAP: &str = "print_stack_map";

/// Pin name of the `sk_buff` dump side table
pub const PRINT_SKB_MAP: &str = "print_skb_map";

// ============================================================================
// Sizes
// ============================================================================

/// Maximum number of frames stored per stack snapshot
pub const MAX_STACK_DEPTH: usize = 50;

/// Size of one `sk_buff` dump entry (NUL padded text)
pub const PRINT_SKB_STR_SIZE: usize = 2048;

// ============================================================================
// Protocol Tags
// ============================================================================

/// `ETH_P_IP`, host byte order
pub const ETH_P_IP: u16 = 0x0800;

/// `ETH_P_IPV6`, host byte order
pub const ETH_P_IPV6: u16 = 0x86DD;

pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;
pub const IPPROTO_ICMPV6: u8 = 58;

// ============================================================================
// Shared Data Structures
// ============================================================================

/// Per-skb metadata captured at the instrumentation hit
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkbMeta {
    /// Network namespace inode number
    pub netns: u32,
    /// `skb->mark`
    pub mark: u32,
    /// Interface index of `skb->dev`
    pub ifindex: u32,
    /// `skb->len`
    pub len: u32,
    /// MTU of `skb->dev`
    pub mtu: u32,
    /// `skb->protocol`, as stored by the kernel (network byte order)
    pub proto: u16,
    #[allow(clippy::pub_underscore_fields)]
    pub _pad: u16,
}

/// L3/L4 endpoints of the packet
///
/// Addresses are 16-byte buffers; only the first 4 bytes are meaningful when
/// `l3_proto` is [`ETH_P_IP`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkbTuple {
    pub saddr: [u8; 16],
    pub daddr: [u8; 16],
    /// Source port, network byte order
    pub sport: u16,
    /// Destination port, network byte order
    pub dport: u16,
    /// L3 protocol tag, host byte order (`ETH_P_IP` / `ETH_P_IPV6`)
    pub l3_proto: u16,
    /// L4 protocol number (`IPPROTO_*`)
    pub l4_proto: u8,
    #[allow(clippy::pub_underscore_fields)]
    pub _pad: u8,
}

/// Event sent from the probes to userspace via the ring buffer
///
/// One record per instrumentation hit.
///
/// **Memory Layout**: `#[repr(C)]`, 120 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct SkbEvent {
    /// TGID of the task that was running when the function was hit
    pub pid: u32,

    /// Probe type (reserved, always 0)
    pub event_type: u32,

    /// Raw instruction pointer reported by the probe
    ///
    /// Not the function entry: single kprobes report entry + 1 on x86-64, and
    /// IBT kernels place an `endbr64` in front of the entry. Userspace corrects
    /// for both before symbol lookup.
    pub addr: u64,

    /// Address of the `sk_buff`, used as the flow key
    pub skb_addr: u64,

    /// `bpf_ktime_get_ns()` at the hit
    pub timestamp: u64,

    /// Key into [`PRINT_SKB_MAP`], 0 when no dump was taken
    pub print_skb_id: u64,

    pub meta: SkbMeta,

    pub tuple: SkbTuple,

    /// Key into [`PRINT_STACK_MAP`]
    ///
    /// **Value**:
    /// - Positive: stack snapshot stored under this id
    /// - Zero or negative: no snapshot (`bpf_get_stackid()` failed or stacks disabled)
    pub print_stack_id: i64,

    /// CPU the hit happened on
    pub cpu: u32,

    #[allow(clippy::pub_underscore_fields)]
    pub _pad: u32,
}

#[cfg(feature = "user")]
use aya::Pod;

// Required to read these types out of BPF maps as plain bytes
#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for SkbEvent {}

#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for SkbMeta {}

#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for SkbTuple {}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn test_event_layout_matches_probe_abi() {
        assert_eq!(size_of::<SkbMeta>(), 24);
        assert_eq!(size_of::<SkbTuple>(), 40);
        assert_eq!(size_of::<SkbEvent>(), 120);

        assert_eq!(offset_of!(SkbEvent, addr), 8);
        assert_eq!(offset_of!(SkbEvent, skb_addr), 16);
        assert_eq!(offset_of!(SkbEvent, meta), 40);
        assert_eq!(offset_of!(SkbEvent, tuple), 64);
        assert_eq!(offset_of!(SkbEvent, print_stack_id), 104);
        assert_eq!(offset_of!(SkbEvent, cpu), 112);
    }
}
