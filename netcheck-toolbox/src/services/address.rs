//! SSRF address filter.
//!
//! Decides whether a resolved address may be probed. Rules are checked in a
//! fixed order and the first match names the reason; any match blocks.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::types::{AddressVerdict, BlockReason};

/// Cloud instance metadata endpoints (AWS/GCP/Azure, AWS IPv6, Alibaba).
const METADATA_ADDRESSES: &[IpAddr] = &[
    IpAddr::V4(Ipv4Addr::new(169, 254, 169, 254)),
    IpAddr::V6(Ipv6Addr::new(0xfd00, 0x0ec2, 0, 0, 0, 0, 0, 0x0254)),
    IpAddr::V4(Ipv4Addr::new(100, 100, 100, 200)),
];

/// IANA special-purpose IPv4 blocks that are not globally reachable.
const RESERVED_V4: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10),
    (Ipv4Addr::new(192, 0, 0, 0), 24),
    (Ipv4Addr::new(192, 0, 2, 0), 24),
    (Ipv4Addr::new(198, 18, 0, 0), 15),
    (Ipv4Addr::new(198, 51, 100, 0), 24),
    (Ipv4Addr::new(203, 0, 113, 0), 24),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
];

/// IETF-reserved and special-purpose IPv6 blocks.
const RESERVED_V6: &[(Ipv6Addr, u8)] = &[
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0), 8),
    (Ipv6Addr::new(0x0100, 0, 0, 0, 0, 0, 0, 0), 8),
    (Ipv6Addr::new(0x0200, 0, 0, 0, 0, 0, 0, 0), 7),
    (Ipv6Addr::new(0x0400, 0, 0, 0, 0, 0, 0, 0), 6),
    (Ipv6Addr::new(0x0800, 0, 0, 0, 0, 0, 0, 0), 5),
    (Ipv6Addr::new(0x1000, 0, 0, 0, 0, 0, 0, 0), 4),
    (Ipv6Addr::new(0x2001, 0, 0, 0, 0, 0, 0, 0), 23),
    (Ipv6Addr::new(0x2001, 0x0db8, 0, 0, 0, 0, 0, 0), 32),
    (Ipv6Addr::new(0x4000, 0, 0, 0, 0, 0, 0, 0), 3),
    (Ipv6Addr::new(0x6000, 0, 0, 0, 0, 0, 0, 0), 3),
    (Ipv6Addr::new(0x8000, 0, 0, 0, 0, 0, 0, 0), 3),
    (Ipv6Addr::new(0xa000, 0, 0, 0, 0, 0, 0, 0), 3),
    (Ipv6Addr::new(0xc000, 0, 0, 0, 0, 0, 0, 0), 3),
    (Ipv6Addr::new(0xe000, 0, 0, 0, 0, 0, 0, 0), 4),
    (Ipv6Addr::new(0xf000, 0, 0, 0, 0, 0, 0, 0), 5),
    (Ipv6Addr::new(0xf800, 0, 0, 0, 0, 0, 0, 0), 6),
    (Ipv6Addr::new(0xfe00, 0, 0, 0, 0, 0, 0, 0), 9),
    (Ipv6Addr::new(0xfec0, 0, 0, 0, 0, 0, 0, 0), 10),
];

/// Classify a string that should hold an IP address.
pub fn classify_str(value: &str) -> AddressVerdict {
    value
        .trim()
        .parse::<IpAddr>()
        .map_or_else(|_| AddressVerdict::block(BlockReason::InvalidAddress), classify)
}

/// Classify an address for probing.
pub fn classify(ip: IpAddr) -> AddressVerdict {
    block_reason(ip).map_or_else(AddressVerdict::allow, AddressVerdict::block)
}

/// First matching block rule, or `None` for a public unicast address.
pub fn block_reason(ip: IpAddr) -> Option<BlockReason> {
    // ::ffff:a.b.c.d and 6to4 2002:aabb:ccdd:: reach the embedded IPv4 host.
    let ip = match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .or_else(|| embedded_6to4(v6))
            .map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    };

    if ip.is_loopback() {
        Some(BlockReason::Loopback)
    } else if is_private(ip) {
        Some(BlockReason::Private)
    } else if is_link_local(ip) {
        Some(BlockReason::LinkLocal)
    } else if ip.is_multicast() {
        Some(BlockReason::Multicast)
    } else if is_reserved(ip) {
        Some(BlockReason::Reserved)
    } else if ip.is_unspecified() {
        Some(BlockReason::Unspecified)
    } else if is_metadata(ip) {
        Some(BlockReason::Metadata)
    } else {
        None
    }
}

/// Exact match against known metadata endpoints.
///
/// Checked on its own so it keeps blocking even if the link-local rule changes.
pub fn is_metadata(ip: IpAddr) -> bool {
    METADATA_ADDRESSES.contains(&ip)
}

/// IPv4 address carried in bits 16..48 of a `2002::/16` address.
fn embedded_6to4(ip: Ipv6Addr) -> Option<Ipv4Addr> {
    let [prefix, high, low, ..] = ip.segments();
    (prefix == 0x2002).then(|| Ipv4Addr::from((u32::from(high) << 16) | u32::from(low)))
}

fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private(),
        // fc00::/7
        IpAddr::V6(v6) => (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

fn is_link_local(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        // fe80::/10
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
    }
}

fn is_reserved(ip: IpAddr) -> bool {
    if ip.is_unspecified() {
        return false;
    }
    match ip {
        IpAddr::V4(v4) => RESERVED_V4
            .iter()
            .any(|&(net, prefix)| in_v4_net(v4, net, prefix)),
        IpAddr::V6(v6) => RESERVED_V6
            .iter()
            .any(|&(net, prefix)| in_v6_net(v6, net, prefix)),
    }
}

fn in_v4_net(ip: Ipv4Addr, net: Ipv4Addr, prefix: u8) -> bool {
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    (ip.to_bits() & mask) == (net.to_bits() & mask)
}

fn in_v6_net(ip: Ipv6Addr, net: Ipv6Addr, prefix: u8) -> bool {
    let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
    (ip.to_bits() & mask) == (net.to_bits() & mask)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reason_of(s: &str) -> Option<BlockReason> {
        block_reason(s.parse().unwrap())
    }

    // ==================== rule tests ====================

    #[test]
    fn test_loopback_blocked() {
        assert_eq!(reason_of("127.0.0.1"), Some(BlockReason::Loopback));
        assert_eq!(reason_of("127.255.0.9"), Some(BlockReason::Loopback));
        assert_eq!(reason_of("::1"), Some(BlockReason::Loopback));
    }

    #[test]
    fn test_private_blocked() {
        for addr in ["10.0.0.1", "172.16.5.4", "172.31.255.255", "192.168.1.1", "fd12:3456::1", "fc00::1"] {
            assert_eq!(reason_of(addr), Some(BlockReason::Private), "{addr}");
        }
    }

    #[test]
    fn test_link_local_blocked() {
        assert_eq!(reason_of("169.254.1.1"), Some(BlockReason::LinkLocal));
        assert_eq!(reason_of("fe80::1"), Some(BlockReason::LinkLocal));
        assert_eq!(reason_of("febf::1"), Some(BlockReason::LinkLocal));
    }

    #[test]
    fn test_multicast_blocked() {
        assert_eq!(reason_of("224.0.0.1"), Some(BlockReason::Multicast));
        assert_eq!(reason_of("239.255.255.250"), Some(BlockReason::Multicast));
        assert_eq!(reason_of("ff02::1"), Some(BlockReason::Multicast));
    }

    #[test]
    fn test_reserved_blocked() {
        for addr in [
            "0.1.2.3",
            "100.64.0.1",
            "192.0.0.8",
            "192.0.2.10",
            "198.18.0.1",
            "198.51.100.7",
            "203.0.113.9",
            "240.0.0.1",
            "255.255.255.255",
            "2001:db8::1",
            "2001:10::1",
            "100::1",
            "fec0::1",
        ] {
            assert_eq!(reason_of(addr), Some(BlockReason::Reserved), "{addr}");
        }
    }

    #[test]
    fn test_unspecified_blocked() {
        assert_eq!(reason_of("0.0.0.0"), Some(BlockReason::Unspecified));
        assert_eq!(reason_of("::"), Some(BlockReason::Unspecified));
    }

    #[test]
    fn test_metadata_always_blocked() {
        let verdict = classify_str("169.254.169.254");
        assert!(!verdict.allowed);
        // The link-local rule fires first; the metadata check still holds on its own.
        assert_eq!(verdict.reason, "Link-local IP blocked");
        assert!(is_metadata("169.254.169.254".parse().unwrap()));
    }

    #[test]
    fn test_metadata_rule_reachable() {
        // fd00:ec2::254 is ULA, 100.100.100.200 is shared space; both are
        // also covered by the explicit list.
        assert!(is_metadata("fd00:ec2::254".parse().unwrap()));
        assert!(is_metadata("100.100.100.200".parse().unwrap()));
        assert!(!is_metadata("169.254.169.253".parse().unwrap()));
    }

    #[test]
    fn test_ipv4_mapped_uses_embedded_address() {
        assert_eq!(reason_of("::ffff:127.0.0.1"), Some(BlockReason::Loopback));
        assert_eq!(reason_of("::ffff:10.1.2.3"), Some(BlockReason::Private));
        assert_eq!(reason_of("::ffff:169.254.169.254"), Some(BlockReason::LinkLocal));
        assert_eq!(reason_of("::ffff:8.8.8.8"), None);
    }

    #[test]
    fn test_6to4_uses_embedded_address() {
        assert_eq!(reason_of("2002:7f00:1::"), Some(BlockReason::Loopback));
        assert_eq!(reason_of("2002:a00:1::1"), Some(BlockReason::Private));
        assert_eq!(reason_of("2002:c0a8:101::"), Some(BlockReason::Private));
        assert_eq!(reason_of("2002:a9fe:a9fe::"), Some(BlockReason::LinkLocal));
        assert_eq!(reason_of("2002::"), Some(BlockReason::Unspecified));
        assert_eq!(reason_of("2002:808:808::1"), None);
    }

    // ==================== public addresses ====================

    #[test]
    fn test_public_unicast_allowed() {
        for addr in [
            "8.8.8.8",
            "1.1.1.1",
            "93.184.216.34",
            "172.32.0.1",
            "100.128.0.1",
            "2606:4700:4700::1111",
            "2001:4860:4860::8888",
        ] {
            let verdict = classify_str(addr);
            assert!(verdict.allowed, "{addr} should be allowed: {}", verdict.reason);
            assert!(verdict.reason.is_empty());
        }
    }

    #[test]
    fn test_invalid_input() {
        let verdict = classify_str("not-an-ip");
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, "Invalid IP address");
        assert!(!classify_str("").allowed);
    }

    #[test]
    fn test_blocked_verdicts_carry_reason() {
        for addr in ["127.0.0.1", "10.0.0.1", "169.254.0.1", "224.0.0.1", "240.0.0.1", "0.0.0.0"] {
            let verdict = classify_str(addr);
            assert!(!verdict.allowed);
            assert!(!verdict.reason.is_empty(), "{addr}");
        }
    }

    #[test]
    fn test_prefix_math_edges() {
        let net = Ipv4Addr::new(172, 16, 0, 0);
        assert!(in_v4_net(Ipv4Addr::new(172, 31, 255, 255), net, 12));
        assert!(!in_v4_net(Ipv4Addr::new(172, 32, 0, 0), net, 12));
        assert!(in_v4_net(Ipv4Addr::new(1, 2, 3, 4), Ipv4Addr::UNSPECIFIED, 0));
        assert!(in_v6_net(Ipv6Addr::LOCALHOST, Ipv6Addr::LOCALHOST, 128));
    }
}
