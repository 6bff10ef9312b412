//! Segment Geometry
//!
//! Pure functions computing how many wire segments a logical frame
//! becomes and where each segment's headers and payload sit. Both carvers
//! and the finalizer consult these so they agree on offsets without any
//! shared state.

use crate::types::GsoContext;

/// Number of wire segments a frame of `frame_len` bytes carves into.
///
/// The repeated per-segment header length is the fixed cost, so the
/// count is the payload-plus-first-header-extra divided by the MSS,
/// rounded up.
pub fn segment_count(ctx: &GsoContext, frame_len: usize) -> usize {
    let payload = frame_len - ctx.hdrs_seg();
    (payload + ctx.mss() - 1) / ctx.mss()
}

/// Header bytes of segment `seg_index`.
///
/// Only the first segment carries the full header area; for
/// [`crate::GsoType::Ipv4Udp`] that is where the one-time UDP header lives.
pub fn header_len(ctx: &GsoContext, seg_index: usize) -> usize {
    if seg_index == 0 {
        ctx.hdrs_total()
    } else {
        ctx.hdrs_seg()
    }
}

/// Payload bytes of segment `seg_index`.
///
/// Every non-last segment occupies exactly one MSS of the original frame
/// layout; the first segment's extra header bytes are absorbed by
/// shrinking its payload window, not by shifting later segments.
pub fn payload_len(
    ctx: &GsoContext,
    seg_index: usize,
    seg_count: usize,
    frame_len: usize,
) -> usize {
    if seg_index + 1 == seg_count {
        frame_len - seg_index * ctx.mss() - header_len(ctx, seg_index)
    } else if seg_index == 0 {
        ctx.mss() - (ctx.hdrs_total() - ctx.hdrs_seg())
    } else {
        ctx.mss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GsoType;

    fn payload_sum(ctx: &GsoContext, frame_len: usize) -> usize {
        let count = segment_count(ctx, frame_len);
        (0..count)
            .map(|i| payload_len(ctx, i, count, frame_len))
            .sum()
    }

    #[test]
    fn test_tcp4_two_segments() {
        let ctx = GsoContext::new(GsoType::Ipv4Tcp, 14, 34, 54, 54, 1460);
        // 2920 payload bytes divide evenly into two full segments
        let frame_len = 54 + 2 * 1460;

        assert_eq!(segment_count(&ctx, frame_len), 2);
        assert_eq!(header_len(&ctx, 0), 54);
        assert_eq!(header_len(&ctx, 1), 54);
        assert_eq!(payload_len(&ctx, 0, 2, frame_len), 1460);
        assert_eq!(payload_len(&ctx, 1, 2, frame_len), 1460);
    }

    #[test]
    fn test_tcp4_short_tail_segment() {
        let ctx = GsoContext::new(GsoType::Ipv4Tcp, 14, 34, 54, 54, 1460);
        let frame_len = 3000;

        assert_eq!(segment_count(&ctx, frame_len), 3);
        assert_eq!(payload_len(&ctx, 0, 3, frame_len), 1460);
        assert_eq!(payload_len(&ctx, 1, 3, frame_len), 1460);
        // 3000 - 2*1460 - 54
        assert_eq!(payload_len(&ctx, 2, 3, frame_len), 26);
    }

    #[test]
    fn test_udp4_first_window_absorbs_udp_header() {
        let ctx = GsoContext::new(GsoType::Ipv4Udp, 14, 34, 42, 34, 1000);
        let frame_len = 2500;

        assert_eq!(segment_count(&ctx, frame_len), 3);
        assert_eq!(header_len(&ctx, 0), 42);
        assert_eq!(header_len(&ctx, 1), 34);
        // First window loses the 8 UDP header bytes
        assert_eq!(payload_len(&ctx, 0, 3, frame_len), 992);
        assert_eq!(payload_len(&ctx, 1, 3, frame_len), 1000);
        assert_eq!(payload_len(&ctx, 2, 3, frame_len), 2500 - 2000 - 34);
    }

    #[test]
    fn test_no_byte_lost_or_duplicated() {
        let tcp = GsoContext::new(GsoType::Ipv4Tcp, 14, 34, 54, 54, 1460);
        let udp = GsoContext::new(GsoType::Ipv4Udp, 14, 34, 42, 34, 1000);
        let tun = GsoContext::new(GsoType::Ipv4Ipv6Tcp, 14, 74, 94, 94, 1360);

        for frame_len in [1514, 2000, 3000, 9000, 65535] {
            for ctx in [&tcp, &udp, &tun] {
                if ctx.is_valid(frame_len) {
                    assert_eq!(
                        payload_sum(ctx, frame_len),
                        frame_len - ctx.hdrs_total(),
                        "payload conservation for {} at {}",
                        ctx.gso_type,
                        frame_len
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_segment() {
        let ctx = GsoContext::new(GsoType::Ipv4Tcp, 14, 34, 54, 54, 1460);
        let frame_len = 54 + 1460;
        assert_eq!(segment_count(&ctx, frame_len), 1);
        assert_eq!(payload_len(&ctx, 0, 1, frame_len), 1460);
    }
}
