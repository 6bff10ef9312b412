//! Segment Carving
//!
//! Two ways to turn a validated logical frame into wire segments, plus
//! the degenerate single-segment path:
//!
//! - [`InPlaceCarver`] walks the frame forward and rewrites it
//!   destructively, segment by segment. No payload byte is ever copied;
//!   the price is a small header save/restore through a caller-supplied
//!   scratch buffer, because each segment's header area overwrites tail
//!   bytes of the previous segment's payload.
//! - [`carve_copy`] writes the rewritten headers into a separate buffer
//!   and reports where the payload sits in the untouched frame, for
//!   scatter-gather transmit paths.
//! - [`finalize_frame`] seals the checksums of a frame that already fits
//!   one wire segment.

use crate::geometry;
use crate::rewrite::{rewrite_headers, udp_datagram_fields};
use crate::types::{ChecksumMode, GsoContext, GsoType};

/// Where a copy-carved segment's pieces live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentParts {
    /// Valid header bytes at the start of the caller's header buffer
    pub header_len: usize,
    /// Payload offset inside the original frame
    pub payload_offset: usize,
    /// Payload length
    pub payload_len: usize,
}

/// Destructive forward-only carver.
///
/// Segments must leave the carver in strictly increasing order and the
/// frame is consumed in the process; the borrow handed out by
/// [`InPlaceCarver::next_segment`] ends before the next carve, so an
/// already-overwritten segment can never be revisited. Independent
/// frames may be carved concurrently; segments of one frame cannot.
#[derive(Debug)]
pub struct InPlaceCarver<'f, 's> {
    ctx: GsoContext,
    frame: &'f mut [u8],
    scratch: &'s mut [u8],
    seg_count: usize,
    next_seg: usize,
}

impl<'f, 's> InPlaceCarver<'f, 's> {
    /// Start carving `frame` with the given context.
    ///
    /// # Arguments
    /// * `ctx` - validated segmentation context
    /// * `frame` - the whole logical frame; rewritten destructively
    /// * `scratch` - header save area of at least `ctx.seg_header_len`
    ///   bytes ([`crate::MAX_HEADER_SIZE`] always suffices)
    pub fn new(ctx: &GsoContext, frame: &'f mut [u8], scratch: &'s mut [u8]) -> Self {
        debug_assert!(ctx.is_valid(frame.len()));
        debug_assert!(scratch.len() >= ctx.hdrs_seg());
        let seg_count = geometry::segment_count(ctx, frame.len());
        Self {
            ctx: *ctx,
            frame,
            scratch,
            seg_count,
            next_seg: 0,
        }
    }

    /// Total number of segments this frame carves into
    pub const fn segment_count(&self) -> usize {
        self.seg_count
    }

    /// Segments already carved
    pub const fn segments_done(&self) -> usize {
        self.next_seg
    }

    /// Carve the next segment and return it as a ready-to-transmit slice
    /// of the frame (headers and payload are contiguous), or `None` once
    /// all segments are done.
    pub fn next_segment(&mut self) -> Option<&mut [u8]> {
        if self.next_seg == self.seg_count {
            return None;
        }
        let idx = self.next_seg;
        self.next_seg += 1;

        let frame_len = self.frame.len();
        let hdr_pos = idx * self.ctx.mss();
        let hdr_len = geometry::header_len(&self.ctx, idx);
        let payload_len = geometry::payload_len(&self.ctx, idx, self.seg_count, frame_len);

        // The one-time UDP fields must come from the pristine frame,
        // before anything below touches it.
        let udp_fields = if idx == 0 && self.ctx.gso_type == GsoType::Ipv4Udp {
            Some(udp_datagram_fields(
                &self.ctx,
                self.frame,
                ChecksumMode::Complete,
            ))
        } else {
            None
        };

        // The header template at the frame start only survives segment 0's
        // rewrite inside the scratch buffer; later segments start from it.
        let seg_hdr = self.ctx.hdrs_seg();
        if idx == 0 {
            self.scratch[..seg_hdr].copy_from_slice(&self.frame[..seg_hdr]);
        } else {
            self.frame[hdr_pos..hdr_pos + seg_hdr].copy_from_slice(&self.scratch[..seg_hdr]);
        }

        let seg = &mut self.frame[hdr_pos..hdr_pos + hdr_len + payload_len];
        let (hdrs, payload) = seg.split_at_mut(hdr_len);
        rewrite_headers(
            &self.ctx,
            hdrs,
            payload,
            idx,
            self.seg_count,
            ChecksumMode::Complete,
            udp_fields,
        );

        Some(seg)
    }
}

/// Non-destructive carve of one segment.
///
/// Copies the original headers into `hdr_out`, rewrites them for segment
/// `seg_index`, and reports where the payload lies in the untouched
/// frame. May be called in any order, repeatedly, and concurrently for
/// distinct indices as long as each call owns its `hdr_out`.
///
/// # Arguments
/// * `frame` - the original frame; never modified
/// * `seg_count` - must equal [`segment_count`](crate::segment_count)
/// * `hdr_out` - at least `ctx.total_header_len` bytes
pub fn carve_copy(
    ctx: &GsoContext,
    frame: &[u8],
    seg_index: usize,
    seg_count: usize,
    hdr_out: &mut [u8],
) -> SegmentParts {
    debug_assert!(ctx.is_valid(frame.len()));
    debug_assert_eq!(seg_count, geometry::segment_count(ctx, frame.len()));
    debug_assert!(seg_index < seg_count);

    let hdr_len = geometry::header_len(ctx, seg_index);
    let payload_len = geometry::payload_len(ctx, seg_index, seg_count, frame.len());
    let payload_offset = hdr_len + seg_index * ctx.mss();

    hdr_out[..ctx.hdrs_total()].copy_from_slice(&frame[..ctx.hdrs_total()]);
    let udp_fields = if seg_index == 0 && ctx.gso_type == GsoType::Ipv4Udp {
        Some(udp_datagram_fields(ctx, frame, ChecksumMode::Complete))
    } else {
        None
    };

    rewrite_headers(
        ctx,
        &mut hdr_out[..hdr_len],
        &frame[payload_offset..payload_offset + payload_len],
        seg_index,
        seg_count,
        ChecksumMode::Complete,
        udp_fields,
    );

    SegmentParts {
        header_len: hdr_len,
        payload_offset,
        payload_len,
    }
}

/// Seal the headers of a frame that fits a single wire segment.
///
/// Applies the same per-protocol rewrite as the carvers, once, always as
/// the last (and only) segment - TCP FIN/PSH are preserved. `mode`
/// selects the transport checksum disposition for devices whose hardware
/// finishes the job.
pub fn finalize_frame(ctx: &GsoContext, frame: &mut [u8], mode: ChecksumMode) {
    debug_assert!(ctx.is_valid(frame.len()));

    let udp_fields = if ctx.gso_type == GsoType::Ipv4Udp {
        Some(udp_datagram_fields(ctx, frame, mode))
    } else {
        None
    };

    let (hdrs, payload) = frame.split_at_mut(ctx.hdrs_total());
    rewrite_headers(ctx, hdrs, payload, 0, 1, mode, udp_fields);
}
