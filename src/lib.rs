//! Generic Segmentation Offload Engine
//!
//! A minimal, no_std GSO/TSO/UFO segmentation engine for virtual NIC
//! transmit paths. Takes one oversized logical frame plus a small context
//! describing its header layout and carves it into wire-sized segments,
//! fixing up IPv4/IPv6/TCP/UDP headers (lengths, identification, sequence
//! numbers, fragment fields, checksums) so every emitted segment is a
//! standards-compliant packet.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      GSO Engine Structure                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐                │
//! │  │   Types    │  │  Geometry  │  │  Checksum  │                │
//! │  │            │  │            │  │            │                │
//! │  │ GsoContext │  │ seg count  │  │ RFC 1071   │                │
//! │  │ GsoType    │  │ hdr/payload│  │ pseudo hdr │                │
//! │  │ validation │  │ lengths    │  │ TCP/UDP    │                │
//! │  └────────────┘  └────────────┘  └────────────┘                │
//! │         │               │               │                      │
//! │         └───────────────┼───────────────┘                      │
//! │                         ▼                                      │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐                │
//! │  │  In-place  │  │  Copy-out  │  │  Finalizer │                │
//! │  │   carver   │  │   carver   │  │ (1 segment)│                │
//! │  └────────────┘  └────────────┘  └────────────┘                │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use morpheus_gso::{GsoContext, GsoType, InPlaceCarver, MAX_HEADER_SIZE};
//!
//! // Ethernet(14) + IPv4(20) + TCP(20) headers, 1460-byte MSS.
//! let ctx = GsoContext::new(GsoType::Ipv4Tcp, 14, 34, 54, 54, 1460);
//! assert!(ctx.is_valid(frame.len()));
//!
//! let mut scratch = [0u8; MAX_HEADER_SIZE];
//! let mut carver = InPlaceCarver::new(&ctx, &mut frame, &mut scratch);
//! while let Some(segment) = carver.next_segment() {
//!     // ... transmit segment via the NIC driver before carving the next ...
//! }
//! ```
//!
//! The engine never allocates and owns no buffers: the frame, the header
//! scratch area and the copy-out header buffer are all caller supplied.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

mod types;
mod geometry;
mod checksum;
mod rewrite;
mod carve;

pub use types::{
    ChecksumMode, GsoContext, GsoError, GsoType, ETHERNET_HEADER_SIZE, MAX_HEADER_SIZE,
};
pub use geometry::{header_len, payload_len, segment_count};
pub use checksum::{calculate_checksum, finalize_checksum, partial_checksum};
pub use carve::{carve_copy, finalize_frame, InPlaceCarver, SegmentParts};
