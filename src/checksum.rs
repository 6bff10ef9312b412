//! Internet Checksum Implementation (RFC 1071)
//!
//! One's complement arithmetic for the IPv4 header checksum plus the
//! pseudo-header and transport sums TCP/UDP need (RFC 793/768, RFC 2460
//! §8.1). Everything works on caller-supplied byte slices in network
//! byte order; nothing allocates.

use crate::types::{IPV6_HEADER_SIZE, UDP_HEADER_SIZE};

/// Accumulate 16-bit words of `data` into a 32-bit partial sum.
///
/// An odd trailing byte is padded with zero. Chunks may be fed in
/// separately as long as each split point is even.
pub fn partial_checksum(data: &[u8], initial: u32) -> u32 {
    let mut sum = initial;
    let mut i = 0;

    while i + 1 < data.len() {
        let word = u16::from_be_bytes([data[i], data[i + 1]]);
        sum = sum.wrapping_add(word as u32);
        i += 2;
    }

    if i < data.len() {
        sum = sum.wrapping_add((data[i] as u32) << 8);
    }

    sum
}

/// Fold a 32-bit partial sum into the final one's complement checksum
pub fn finalize_checksum(sum: u32) -> u16 {
    let mut s = sum;
    while s >> 16 != 0 {
        s = (s & 0xFFFF) + (s >> 16);
    }
    !(s as u16)
}

/// Calculate the Internet checksum over one contiguous buffer.
///
/// Used for the IPv4 header checksum field, which must be zeroed in the
/// buffer beforehand.
pub fn calculate_checksum(data: &[u8]) -> u16 {
    finalize_checksum(partial_checksum(data, 0))
}

/// IPv4 pseudo-header partial sum (RFC 793/768).
///
/// Covers source/destination address, protocol and the transport length
/// derived from the header's own total-length and IHL fields. `hdr` is
/// the IPv4 header starting at version/IHL.
pub fn ipv4_pseudo_sum(hdr: &[u8]) -> u32 {
    let ihl = ((hdr[0] & 0x0F) as usize) * 4;
    let total_len = u16::from_be_bytes([hdr[2], hdr[3]]) as usize;
    let transport_len = total_len.saturating_sub(ihl);

    // Source and destination addresses
    let mut sum = partial_checksum(&hdr[12..20], 0);
    sum = sum.wrapping_add(hdr[9] as u32);
    sum.wrapping_add(transport_len as u32)
}

/// IPv6 pseudo-header partial sum (RFC 2460 §8.1).
///
/// The transport protocol and length are passed explicitly so the same
/// function serves the tunnelled inner header.
pub fn ipv6_pseudo_sum(hdr: &[u8], protocol: u8, transport_len: u32) -> u32 {
    // Source and destination addresses
    let mut sum = partial_checksum(&hdr[8..IPV6_HEADER_SIZE], 0);
    sum = sum.wrapping_add(transport_len >> 16);
    sum = sum.wrapping_add(transport_len & 0xFFFF);
    sum.wrapping_add(protocol as u32)
}

/// Full TCP checksum over pseudo header, TCP header and payload.
///
/// The checksum field itself is skipped, so it need not be zeroed.
pub fn tcp_checksum(pseudo_sum: u32, tcp_hdr: &[u8], payload: &[u8]) -> u16 {
    // Header words before and after the checksum field at offset 16
    let mut sum = partial_checksum(&tcp_hdr[..16], pseudo_sum);
    sum = partial_checksum(&tcp_hdr[18..], sum);
    sum = partial_checksum(payload, sum);
    finalize_checksum(sum)
}

/// Full UDP checksum over pseudo header, UDP header and payload.
///
/// The checksum field is skipped; a computed value of zero is sent as
/// 0xFFFF per RFC 768.
pub fn udp_checksum(pseudo_sum: u32, udp_hdr: &[u8], payload: &[u8]) -> u16 {
    // Ports and length; the checksum field at offset 6 is skipped
    let mut sum = partial_checksum(&udp_hdr[..6], pseudo_sum);
    sum = partial_checksum(&udp_hdr[UDP_HEADER_SIZE..], sum);
    sum = partial_checksum(payload, sum);
    match finalize_checksum(sum) {
        0 => 0xFFFF,
        csum => csum,
    }
}
