//! Text for the metadata and 4-tuple sections

use skbtrace_common::{
    SkbMeta, SkbTuple, ETH_P_IP, ETH_P_IPV6, IPPROTO_ICMP, IPPROTO_ICMPV6, IPPROTO_TCP,
    IPPROTO_UDP,
};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Short name of an L4 protocol number, empty if unrecognized
#[must_use]
pub fn l4_proto_name(proto: u8) -> &'static str {
    match proto {
        IPPROTO_TCP => "tcp",
        IPPROTO_UDP => "udp",
        IPPROTO_ICMP => "icmp",
        IPPROTO_ICMPV6 => "icmp6",
        _ => "",
    }
}

/// Endpoint address text for an L3 protocol tag
///
/// IPv4 uses the first 4 bytes; IPv6 uses all 16 and is bracketed so the
/// port separator stays unambiguous. Unknown tags render empty.
#[must_use]
pub fn addr_to_string(l3_proto: u16, addr: &[u8; 16]) -> String {
    match l3_proto {
        ETH_P_IP => Ipv4Addr::new(addr[0], addr[1], addr[2], addr[3]).to_string(),
        ETH_P_IPV6 => format!("[{}]", Ipv6Addr::from(*addr)),
        _ => String::new(),
    }
}

/// `saddr:sport->daddr:dport(proto)`, ports in host order
#[must_use]
pub fn format_tuple(tuple: &SkbTuple) -> String {
    format!(
        "{}:{}->{}:{}({})",
        addr_to_string(tuple.l3_proto, &tuple.saddr),
        u16::from_be(tuple.sport),
        addr_to_string(tuple.l3_proto, &tuple.daddr),
        u16::from_be(tuple.dport),
        l4_proto_name(tuple.l4_proto)
    )
}

/// `netns=.. mark=0x.. ifindex=.. proto=.. mtu=.. len=..`
#[must_use]
pub fn format_meta(meta: &SkbMeta) -> String {
    format!(
        "netns={} mark=0x{:x} ifindex={} proto={:x} mtu={} len={}",
        meta.netns, meta.mark, meta.ifindex, meta.proto, meta.mtu, meta.len
    )
}
