//! Common test utilities: logical frame builders for every offload variant

#![allow(dead_code)]

pub const ETH_LEN: usize = 14;
pub const IPV4_LEN: usize = 20;
pub const IPV6_LEN: usize = 40;
pub const TCP_LEN: usize = 20;
pub const UDP_LEN: usize = 8;

pub const SRC_V4: [u8; 4] = [10, 0, 0, 1];
pub const DST_V4: [u8; 4] = [10, 0, 0, 2];
pub const SRC_V6: [u8; 16] = [
    0xfd, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
];
pub const DST_V6: [u8; 16] = [
    0xfd, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x02,
];

pub fn be16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([buf[off], buf[off + 1]])
}

pub fn be32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn ethernet(frame: &mut [u8], ethertype: u16) {
    frame[0..6].copy_from_slice(&[0x02, 0, 0, 0, 0, 0x02]);
    frame[6..12].copy_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
    frame[12..14].copy_from_slice(&ethertype.to_be_bytes());
}

/// Write a 20-byte IPv4 header at `off`. Checksum is left zero; the
/// engine seals it.
fn ipv4(frame: &mut [u8], off: usize, total_len: u16, ident: u16, flags_frag: u16, proto: u8) {
    frame[off] = 0x45;
    frame[off + 2..off + 4].copy_from_slice(&total_len.to_be_bytes());
    frame[off + 4..off + 6].copy_from_slice(&ident.to_be_bytes());
    frame[off + 6..off + 8].copy_from_slice(&flags_frag.to_be_bytes());
    frame[off + 8] = 64;
    frame[off + 9] = proto;
    frame[off + 12..off + 16].copy_from_slice(&SRC_V4);
    frame[off + 16..off + 20].copy_from_slice(&DST_V4);
}

/// Write a 40-byte IPv6 header at `off`
fn ipv6(frame: &mut [u8], off: usize, payload_len: u16, next_header: u8) {
    frame[off] = 0x60;
    frame[off + 4..off + 6].copy_from_slice(&payload_len.to_be_bytes());
    frame[off + 6] = next_header;
    frame[off + 7] = 64;
    frame[off + 8..off + 24].copy_from_slice(&SRC_V6);
    frame[off + 24..off + 40].copy_from_slice(&DST_V6);
}

/// Write a 20-byte TCP header at `off`. Checksum is left zero.
fn tcp(frame: &mut [u8], off: usize, seq: u32, flags: u8) {
    frame[off..off + 2].copy_from_slice(&49152u16.to_be_bytes());
    frame[off + 2..off + 4].copy_from_slice(&80u16.to_be_bytes());
    frame[off + 4..off + 8].copy_from_slice(&seq.to_be_bytes());
    frame[off + 12] = 5 << 4;
    frame[off + 13] = flags;
    frame[off + 14..off + 16].copy_from_slice(&65535u16.to_be_bytes());
}

/// Write an 8-byte UDP header at `off`. Checksum is left zero.
fn udp(frame: &mut [u8], off: usize, len: u16) {
    frame[off..off + 2].copy_from_slice(&49152u16.to_be_bytes());
    frame[off + 2..off + 4].copy_from_slice(&53u16.to_be_bytes());
    frame[off + 4..off + 6].copy_from_slice(&len.to_be_bytes());
}

fn fill_payload(payload: &mut [u8]) {
    for (i, b) in payload.iter_mut().enumerate() {
        *b = (i % 251) as u8;
    }
}

/// Ethernet / IPv4 / TCP logical frame. Headers end at byte 54.
pub fn tcp4_frame(payload_len: usize, seq: u32, ident: u16, tcp_flags: u8) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_LEN + IPV4_LEN + TCP_LEN + payload_len];
    ethernet(&mut frame, 0x0800);
    ipv4(
        &mut frame,
        ETH_LEN,
        (IPV4_LEN + TCP_LEN + payload_len) as u16,
        ident,
        0x4000,
        6,
    );
    tcp(&mut frame, ETH_LEN + IPV4_LEN, seq, tcp_flags);
    fill_payload(&mut frame[54..]);
    frame
}

/// Ethernet / IPv4 / UDP logical frame (one unfragmented datagram).
/// Headers end at byte 42.
pub fn udp4_frame(payload_len: usize, ident: u16) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_LEN + IPV4_LEN + UDP_LEN + payload_len];
    ethernet(&mut frame, 0x0800);
    ipv4(
        &mut frame,
        ETH_LEN,
        (IPV4_LEN + UDP_LEN + payload_len) as u16,
        ident,
        0,
        17,
    );
    udp(&mut frame, ETH_LEN + IPV4_LEN, (UDP_LEN + payload_len) as u16);
    fill_payload(&mut frame[42..]);
    frame
}

/// Ethernet / IPv6 / TCP logical frame. Headers end at byte 74.
pub fn tcp6_frame(payload_len: usize, seq: u32, tcp_flags: u8) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_LEN + IPV6_LEN + TCP_LEN + payload_len];
    ethernet(&mut frame, 0x86DD);
    ipv6(&mut frame, ETH_LEN, (TCP_LEN + payload_len) as u16, 6);
    tcp(&mut frame, ETH_LEN + IPV6_LEN, seq, tcp_flags);
    fill_payload(&mut frame[74..]);
    frame
}

/// Ethernet / IPv6 / UDP logical frame. Headers end at byte 62.
pub fn udp6_frame(payload_len: usize) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_LEN + IPV6_LEN + UDP_LEN + payload_len];
    ethernet(&mut frame, 0x86DD);
    ipv6(&mut frame, ETH_LEN, (UDP_LEN + payload_len) as u16, 17);
    udp(&mut frame, ETH_LEN + IPV6_LEN, (UDP_LEN + payload_len) as u16);
    fill_payload(&mut frame[62..]);
    frame
}

/// Ethernet / IPv4(proto 41) / IPv6 / TCP tunnel frame. Outer L3 at 14,
/// inner transport at 74, headers end at byte 94.
pub fn tunnel_tcp_frame(payload_len: usize, seq: u32, ident: u16, tcp_flags: u8) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_LEN + IPV4_LEN + IPV6_LEN + TCP_LEN + payload_len];
    ethernet(&mut frame, 0x0800);
    ipv4(
        &mut frame,
        ETH_LEN,
        (IPV4_LEN + IPV6_LEN + TCP_LEN + payload_len) as u16,
        ident,
        0x4000,
        41,
    );
    ipv6(
        &mut frame,
        ETH_LEN + IPV4_LEN,
        (TCP_LEN + payload_len) as u16,
        6,
    );
    tcp(&mut frame, ETH_LEN + IPV4_LEN + IPV6_LEN, seq, tcp_flags);
    fill_payload(&mut frame[94..]);
    frame
}

/// Ethernet / IPv4(proto 41) / IPv6 / UDP tunnel frame. Headers end at
/// byte 82.
pub fn tunnel_udp_frame(payload_len: usize, ident: u16) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_LEN + IPV4_LEN + IPV6_LEN + UDP_LEN + payload_len];
    ethernet(&mut frame, 0x0800);
    ipv4(
        &mut frame,
        ETH_LEN,
        (IPV4_LEN + IPV6_LEN + UDP_LEN + payload_len) as u16,
        ident,
        0x4000,
        41,
    );
    ipv6(
        &mut frame,
        ETH_LEN + IPV4_LEN,
        (UDP_LEN + payload_len) as u16,
        17,
    );
    udp(
        &mut frame,
        ETH_LEN + IPV4_LEN + IPV6_LEN,
        (UDP_LEN + payload_len) as u16,
    );
    fill_payload(&mut frame[82..]);
    frame
}
