//! Per-Protocol Header Rewrite
//!
//! The field-level fixups that turn one copy of the original headers into
//! the headers of a specific wire segment. Shared by the in-place carver,
//! the copy-out carver and the single-segment finalizer: all three hand
//! this module a mutable header area plus the segment's payload slice.
//!
//! TCP types are true segmentation (every segment is an independent
//! packet with its own transport header); IPv4/UDP falls back to IP
//! fragmentation, because UDP has no continuation semantics - only the
//! first fragment carries the UDP header, and its checksum covers the
//! whole unfragmented datagram.

use crate::checksum::{
    calculate_checksum, finalize_checksum, ipv4_pseudo_sum, ipv6_pseudo_sum, partial_checksum,
    tcp_checksum, udp_checksum,
};
use crate::types::{ChecksumMode, GsoContext, GsoType, IPV6_HEADER_SIZE, UDP_HEADER_SIZE};

/// IP protocol number for TCP
pub(crate) const IP_PROTO_TCP: u8 = 6;
/// IP protocol number for UDP
pub(crate) const IP_PROTO_UDP: u8 = 17;

// IPv4 header field offsets
const IPV4_TOTAL_LEN: usize = 2;
const IPV4_IDENT: usize = 4;
const IPV4_FLAGS_FRAG: usize = 6;
const IPV4_CHECKSUM: usize = 10;
/// "More fragments" bit in the flags/fragment-offset word
const IPV4_FLAG_MF: u16 = 0x2000;

// IPv6 header field offsets
const IPV6_PAYLOAD_LEN: usize = 4;

// TCP header field offsets
const TCP_SEQ: usize = 4;
const TCP_FLAGS: usize = 13;
const TCP_CHECKSUM: usize = 16;
const TCP_FLAG_FIN: u8 = 0x01;
const TCP_FLAG_PSH: u8 = 0x08;

// UDP header field offsets
const UDP_LEN: usize = 4;
const UDP_CHECKSUM: usize = 6;

fn read_be16(buf: &[u8], off: usize) -> u16 {
    u16::from_be_bytes([buf[off], buf[off + 1]])
}

fn write_be16(buf: &mut [u8], off: usize, value: u16) {
    buf[off..off + 2].copy_from_slice(&value.to_be_bytes());
}

fn read_be32(buf: &[u8], off: usize) -> u32 {
    u32::from_be_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn write_be32(buf: &mut [u8], off: usize, value: u32) {
    buf[off..off + 4].copy_from_slice(&value.to_be_bytes());
}

/// Recompute and store the IPv4 header checksum over IHL bytes
fn seal_ipv4_checksum(ip: &mut [u8]) {
    let ihl = ((ip[0] & 0x0F) as usize) * 4;
    write_be16(ip, IPV4_CHECKSUM, 0);
    let csum = calculate_checksum(&ip[..ihl]);
    write_be16(ip, IPV4_CHECKSUM, csum);
}

/// Segment fixup of an IPv4 header in TCP/tunnel style: total length,
/// incremented identification, fresh header checksum.
///
/// # Returns
/// The pseudo-header partial sum of the updated header.
fn update_ipv4_header(hdrs: &mut [u8], l3: usize, payload_len: usize, seg_index: usize) -> u32 {
    let hdr_len = hdrs.len();
    let ip = &mut hdrs[l3..];

    write_be16(ip, IPV4_TOTAL_LEN, (payload_len + hdr_len - l3) as u16);
    let ident = read_be16(ip, IPV4_IDENT).wrapping_add(seg_index as u16);
    write_be16(ip, IPV4_IDENT, ident);
    seal_ipv4_checksum(ip);

    let ihl = ((ip[0] & 0x0F) as usize) * 4;
    ipv4_pseudo_sum(&ip[..ihl])
}

/// Fragment fixup of an IPv4 header in UDP style: total length,
/// fragment offset in 8-byte units, "more fragments" flag, fresh header
/// checksum. Identification is left alone so the receiver can reassemble.
fn update_ipv4_header_frag(
    hdrs: &mut [u8],
    l3: usize,
    payload_len: usize,
    frag_byte_offset: usize,
    is_last: bool,
) {
    let hdr_len = hdrs.len();
    let ip = &mut hdrs[l3..];

    write_be16(ip, IPV4_TOTAL_LEN, (payload_len + hdr_len - l3) as u16);
    let mut flags_frag = (frag_byte_offset >> 3) as u16;
    if !is_last {
        flags_frag |= IPV4_FLAG_MF;
    }
    write_be16(ip, IPV4_FLAGS_FRAG, flags_frag);
    seal_ipv4_checksum(ip);
}

/// Segment fixup of an IPv6 header at `l3`: payload length field (which
/// counts everything after the fixed header, L4 header included).
///
/// # Returns
/// The pseudo-header partial sum for `protocol` over that length.
fn update_ipv6_header(hdrs: &mut [u8], l3: usize, payload_len: usize, protocol: u8) -> u32 {
    let hdr_len = hdrs.len();
    let ip = &mut hdrs[l3..];

    let ip_payload = (hdr_len - (l3 + IPV6_HEADER_SIZE) + payload_len) as u16;
    write_be16(ip, IPV6_PAYLOAD_LEN, ip_payload);
    ipv6_pseudo_sum(ip, protocol, ip_payload as u32)
}

/// Offset of the tunnelled IPv6 header, read from the outer IPv4 header's
/// IHL field (IP options can vary the outer header size)
fn inner_ipv6_offset(hdrs: &[u8], l3: usize) -> usize {
    l3 + ((hdrs[l3] & 0x0F) as usize) * 4
}

/// Segment fixup of a TCP header: advance the sequence number by the
/// payload bytes of prior segments, clear FIN/PSH on non-last segments,
/// seal the checksum per `mode`.
fn update_tcp_header(
    pseudo_sum: u32,
    hdrs: &mut [u8],
    l4: usize,
    payload: &[u8],
    seg_index: usize,
    mss: usize,
    is_last: bool,
    mode: ChecksumMode,
) {
    let tcp = &mut hdrs[l4..];

    let seq = read_be32(tcp, TCP_SEQ).wrapping_add((seg_index * mss) as u32);
    write_be32(tcp, TCP_SEQ, seq);
    if !is_last {
        tcp[TCP_FLAGS] &= !(TCP_FLAG_FIN | TCP_FLAG_PSH);
    }

    let csum = match mode {
        ChecksumMode::None => 0,
        ChecksumMode::PseudoHeader => finalize_checksum(pseudo_sum),
        ChecksumMode::Complete => tcp_checksum(pseudo_sum, tcp, payload),
    };
    write_be16(tcp, TCP_CHECKSUM, csum);
}

/// Segment fixup of a UDP header where every segment is an independent
/// datagram (IPv6 and tunnel types): length field and checksum per `mode`
fn update_udp_header(
    pseudo_sum: u32,
    hdrs: &mut [u8],
    l4: usize,
    payload: &[u8],
    mode: ChecksumMode,
) {
    let hdr_len = hdrs.len();
    let udp = &mut hdrs[l4..];

    write_be16(udp, UDP_LEN, (hdr_len - l4 + payload.len()) as u16);
    let csum = match mode {
        ChecksumMode::None => 0,
        ChecksumMode::PseudoHeader => finalize_checksum(pseudo_sum),
        ChecksumMode::Complete => udp_checksum(pseudo_sum, udp, payload),
    };
    write_be16(udp, UDP_CHECKSUM, csum);
}

/// One-time UDP length/checksum pair for an IPv4 fragmentation frame.
///
/// Must be computed from the frame as it looked before any segment
/// rewrite: the checksum covers the whole unfragmented datagram, and the
/// pseudo-header sum comes from the original IPv4 header. The embedded
/// UDP length is clamped to the bytes actually present in the frame,
/// with a floor of one UDP header.
pub(crate) fn udp_datagram_fields(
    ctx: &GsoContext,
    frame: &[u8],
    mode: ChecksumMode,
) -> (u16, u16) {
    let l4 = ctx.l4();
    let udp = &frame[l4..l4 + UDP_HEADER_SIZE];

    let mut udp_len = read_be16(udp, UDP_LEN) as usize;
    let avail = frame.len() - l4;
    if udp_len > avail {
        udp_len = avail;
    }
    if udp_len < UDP_HEADER_SIZE {
        udp_len = UDP_HEADER_SIZE;
    }

    let csum = match mode {
        ChecksumMode::None => 0,
        ChecksumMode::PseudoHeader => finalize_checksum(ipv4_pseudo_sum(&frame[ctx.l3()..])),
        ChecksumMode::Complete => {
            let mut sum = ipv4_pseudo_sum(&frame[ctx.l3()..]);
            // Ports, then the clamped length standing in for the stored
            // field, then the datagram payload; checksum field skipped.
            sum = partial_checksum(&udp[..4], sum);
            sum = sum.wrapping_add(udp_len as u32);
            sum = partial_checksum(&frame[l4 + UDP_HEADER_SIZE..l4 + udp_len], sum);
            match finalize_checksum(sum) {
                0 => 0xFFFF,
                csum => csum,
            }
        }
    };

    (udp_len as u16, csum)
}

/// Rewrite one segment's headers in place.
///
/// `hdrs` is exactly the segment's header area (so its length already
/// reflects whether this is a first or a later segment) and `payload` the
/// segment's payload bytes. `udp_fields` carries the precomputed
/// datagram length/checksum for the first IPv4/UDP fragment and must be
/// `None` otherwise.
pub(crate) fn rewrite_headers(
    ctx: &GsoContext,
    hdrs: &mut [u8],
    payload: &[u8],
    seg_index: usize,
    seg_count: usize,
    mode: ChecksumMode,
    udp_fields: Option<(u16, u16)>,
) {
    let is_last = seg_index + 1 == seg_count;

    match ctx.gso_type {
        GsoType::Ipv4Tcp => {
            let pseudo = update_ipv4_header(hdrs, ctx.l3(), payload.len(), seg_index);
            update_tcp_header(
                pseudo,
                hdrs,
                ctx.l4(),
                payload,
                seg_index,
                ctx.mss(),
                is_last,
                mode,
            );
        }
        GsoType::Ipv4Udp => {
            if let Some((udp_len, udp_csum)) = udp_fields {
                // Only the first fragment carries the UDP header.
                let udp = &mut hdrs[ctx.l4()..];
                write_be16(udp, UDP_LEN, udp_len);
                write_be16(udp, UDP_CHECKSUM, udp_csum);
            }
            update_ipv4_header_frag(
                hdrs,
                ctx.l3(),
                payload.len(),
                seg_index * ctx.mss(),
                is_last,
            );
        }
        GsoType::Ipv6Tcp => {
            let pseudo = update_ipv6_header(hdrs, ctx.l3(), payload.len(), IP_PROTO_TCP);
            update_tcp_header(
                pseudo,
                hdrs,
                ctx.l4(),
                payload,
                seg_index,
                ctx.mss(),
                is_last,
                mode,
            );
        }
        GsoType::Ipv6Udp => {
            let pseudo = update_ipv6_header(hdrs, ctx.l3(), payload.len(), IP_PROTO_UDP);
            update_udp_header(pseudo, hdrs, ctx.l4(), payload, mode);
        }
        GsoType::Ipv4Ipv6Tcp => {
            let inner = inner_ipv6_offset(hdrs, ctx.l3());
            let pseudo = update_ipv6_header(hdrs, inner, payload.len(), IP_PROTO_TCP);
            update_tcp_header(
                pseudo,
                hdrs,
                ctx.l4(),
                payload,
                seg_index,
                ctx.mss(),
                is_last,
                mode,
            );
            update_ipv4_header(hdrs, ctx.l3(), payload.len(), seg_index);
        }
        GsoType::Ipv4Ipv6Udp => {
            let inner = inner_ipv6_offset(hdrs, ctx.l3());
            let pseudo = update_ipv6_header(hdrs, inner, payload.len(), IP_PROTO_UDP);
            update_udp_header(pseudo, hdrs, ctx.l4(), payload, mode);
            update_ipv4_header(hdrs, ctx.l3(), payload.len(), seg_index);
        }
    }
}
