use std::net::IpAddr;

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use pcap_parser::Linktype;
use thiserror::Error;

const UDP_HEADER_LEN: usize = 8;
/// BSD loopback frames start with a 4-byte address family.
const NULL_HEADER_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum UdpError {
    #[error("packet slice error: {0}")]
    Slice(String),
    #[error("missing network layer in packet")]
    MissingNetworkLayer,
    #[error("missing IP payload in packet")]
    MissingIpPayload,
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

/// A UDP datagram lifted out of a link-layer frame.
#[derive(Debug)]
pub struct UdpDatagram<'a> {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

impl UdpDatagram<'_> {
    pub fn source(&self) -> String {
        endpoint(self.src_ip, self.src_port)
    }

    pub fn destination(&self) -> String {
        endpoint(self.dst_ip, self.dst_port)
    }
}

fn endpoint(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(ip) => format!("{ip}:{port}"),
        IpAddr::V6(ip) => format!("[{ip}]:{port}"),
    }
}

/// Slice a frame down to its UDP payload.
///
/// Returns `Ok(None)` for unsupported link types and non-UDP traffic.
pub fn parse_udp_datagram(
    linktype: Linktype,
    data: &[u8],
) -> Result<Option<UdpDatagram<'_>>, UdpError> {
    let sliced = match linktype {
        Linktype::ETHERNET => {
            SlicedPacket::from_ethernet(data).map_err(|e| UdpError::Slice(e.to_string()))?
        }
        Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => {
            SlicedPacket::from_ip(data).map_err(|e| UdpError::Slice(e.to_string()))?
        }
        Linktype::NULL => {
            let ip = data.get(NULL_HEADER_LEN..).ok_or(UdpError::TooShort {
                needed: NULL_HEADER_LEN,
                actual: data.len(),
            })?;
            SlicedPacket::from_ip(ip).map_err(|e| UdpError::Slice(e.to_string()))?
        }
        _ => return Ok(None),
    };

    let net = sliced.net.ok_or(UdpError::MissingNetworkLayer)?;
    let udp = match sliced.transport {
        Some(TransportSlice::Udp(udp)) => udp,
        _ => return Ok(None),
    };

    let (src_ip, dst_ip) = match net {
        NetSlice::Ipv4(ref ipv4) => (
            IpAddr::V4(ipv4.header().source_addr()),
            IpAddr::V4(ipv4.header().destination_addr()),
        ),
        NetSlice::Ipv6(ref ipv6) => (
            IpAddr::V6(ipv6.header().source_addr()),
            IpAddr::V6(ipv6.header().destination_addr()),
        ),
    };

    let ip_payload = net.ip_payload_ref().ok_or(UdpError::MissingIpPayload)?;
    let payload = ip_payload
        .payload
        .get(UDP_HEADER_LEN..)
        .ok_or(UdpError::TooShort {
            needed: UDP_HEADER_LEN,
            actual: ip_payload.payload.len(),
        })?;

    Ok(Some(UdpDatagram {
        src_ip,
        src_port: udp.source_port(),
        dst_ip,
        dst_port: udp.destination_port(),
        payload,
    }))
}

#[cfg(test)]
mod tests {
    use super::{UdpError, parse_udp_datagram};
    use etherparse::PacketBuilder;
    use pcap_parser::Linktype;

    #[test]
    fn ethernet_udp_is_sliced() {
        let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
            .ipv4([192, 168, 0, 1], [192, 168, 0, 2], 64)
            .udp(50000, 22023);
        let payload = [0x0c, 0x00, 0x01];
        let mut packet = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut packet, &payload).unwrap();

        let datagram = parse_udp_datagram(Linktype::ETHERNET, &packet)
            .unwrap()
            .expect("udp datagram");
        assert_eq!(datagram.dst_port, 22023);
        assert_eq!(datagram.payload, payload);
        assert_eq!(datagram.source(), "192.168.0.1:50000");
        assert_eq!(datagram.destination(), "192.168.0.2:22023");
    }

    #[test]
    fn raw_ipv6_udp_is_sliced() {
        let mut loopback = [0u8; 16];
        loopback[15] = 1;
        let builder = PacketBuilder::ipv6([0; 16], loopback, 64).udp(22023, 40000);
        let payload = [0x09];
        let mut packet = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut packet, &payload).unwrap();

        let datagram = parse_udp_datagram(Linktype::RAW, &packet)
            .unwrap()
            .expect("udp datagram");
        assert_eq!(datagram.src_port, 22023);
        assert_eq!(datagram.destination(), "[::1]:40000");
    }

    #[test]
    fn loopback_frames_skip_family_header() {
        let builder = PacketBuilder::ipv4([127, 0, 0, 1], [127, 0, 0, 1], 64).udp(1, 22024);
        let payload = [0x01, 0x00, 0x02];
        let mut packet = vec![2, 0, 0, 0];
        builder.write(&mut packet, &payload).unwrap();

        let datagram = parse_udp_datagram(Linktype::NULL, &packet)
            .unwrap()
            .expect("udp datagram");
        assert_eq!(datagram.payload, payload);
    }

    #[test]
    fn tcp_is_ignored() {
        let builder = PacketBuilder::ethernet2([1, 1, 1, 1, 1, 1], [2, 2, 2, 2, 2, 2])
            .ipv4([10, 0, 0, 1], [10, 0, 0, 2], 64)
            .tcp(1000, 22023, 0, 0);
        let payload = [0u8; 4];
        let mut packet = Vec::<u8>::with_capacity(builder.size(payload.len()));
        builder.write(&mut packet, &payload).unwrap();

        assert!(parse_udp_datagram(Linktype::ETHERNET, &packet).unwrap().is_none());
    }

    #[test]
    fn empty_frame_is_a_slice_error() {
        let result = parse_udp_datagram(Linktype::ETHERNET, &[]);
        assert!(matches!(result, Err(UdpError::Slice(_))));
    }

    #[test]
    fn unsupported_linktype_is_skipped() {
        assert!(parse_udp_datagram(Linktype(147), &[0u8; 32]).unwrap().is_none());
    }
}
