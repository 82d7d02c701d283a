//! Route origin protocol names (`include/uapi/linux/rtnetlink.h`)

pub fn protocol_name(protocol: u8) -> &'static str {
    match protocol {
        0 => "unspec",
        1 => "redirect",
        2 => "kernel",
        3 => "boot",
        4 => "static",
        8 => "gated",
        9 => "ra",
        10 => "mrt",
        11 => "zebra",
        12 => "bird",
        13 => "dnrouted",
        14 => "xorp",
        15 => "ntk",
        16 => "dhcp",
        17 => "mrouted",
        42 => "babel",
        186 => "bgp",
        187 => "isis",
        188 => "ospf",
        189 => "rip",
        192 => "eigrp",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_protocols() {
        assert_eq!(protocol_name(2), "kernel");
        assert_eq!(protocol_name(4), "static");
        assert_eq!(protocol_name(16), "dhcp");
        assert_eq!(protocol_name(186), "bgp");
        assert_eq!(protocol_name(187), "isis");
    }

    #[test]
    fn test_unassigned_protocols() {
        assert_eq!(protocol_name(5), "unknown");
        assert_eq!(protocol_name(250), "unknown");
        assert_eq!(protocol_name(255), "unknown");
    }
}
