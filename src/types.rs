//! Core Types for the GSO Engine

use core::fmt;

/// Ethernet header size - the minimum L3 offset
pub const ETHERNET_HEADER_SIZE: usize = 14;

/// Minimum IPv4 header size (no options)
pub const IPV4_MIN_HEADER_SIZE: usize = 20;

/// IPv6 header size (fixed, no extension headers)
pub const IPV6_HEADER_SIZE: usize = 40;

/// Minimum TCP header size (no options)
pub const TCP_MIN_HEADER_SIZE: usize = 20;

/// UDP header size
pub const UDP_HEADER_SIZE: usize = 8;

/// Upper bound on the header area of any supported frame layout.
///
/// Sizes the in-place carver's scratch buffer and the copy-out carver's
/// header buffer for every protocol combination, IP options included.
pub const MAX_HEADER_SIZE: usize = 256;

/// Protocol combination carried by a GSO frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GsoType {
    /// IPv4 + TCP (classic TSO)
    Ipv4Tcp = 1,
    /// IPv4 + UDP - emitted as IP fragments, only the first carries
    /// the UDP header (UFO)
    Ipv4Udp = 2,
    /// IPv6 + TCP
    Ipv6Tcp = 3,
    /// IPv6 + UDP - independent UDP datagrams per segment
    Ipv6Udp = 4,
    /// IPv6 tunnelled in IPv4, TCP transport
    Ipv4Ipv6Tcp = 5,
    /// IPv6 tunnelled in IPv4, UDP transport
    Ipv4Ipv6Udp = 6,
}

impl GsoType {
    /// Parse from the wire/descriptor byte value
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Ipv4Tcp),
            2 => Some(Self::Ipv4Udp),
            3 => Some(Self::Ipv6Tcp),
            4 => Some(Self::Ipv6Udp),
            5 => Some(Self::Ipv4Ipv6Tcp),
            6 => Some(Self::Ipv4Ipv6Udp),
            _ => None,
        }
    }

    /// Descriptor byte value
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// TCP transport?
    pub const fn is_tcp(self) -> bool {
        matches!(self, Self::Ipv4Tcp | Self::Ipv6Tcp | Self::Ipv4Ipv6Tcp)
    }

    /// UDP transport?
    pub const fn is_udp(self) -> bool {
        !self.is_tcp()
    }

    /// Plain IPv4 outer header (not tunnelled)?
    pub const fn is_ipv4(self) -> bool {
        matches!(self, Self::Ipv4Tcp | Self::Ipv4Udp)
    }

    /// Plain IPv6 header?
    pub const fn is_ipv6(self) -> bool {
        matches!(self, Self::Ipv6Tcp | Self::Ipv6Udp)
    }

    /// IPv6-in-IPv4 tunnel?
    pub const fn is_tunnel(self) -> bool {
        matches!(self, Self::Ipv4Ipv6Tcp | Self::Ipv4Ipv6Udp)
    }
}

impl fmt::Display for GsoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ipv4Tcp => "IPv4/TCP",
            Self::Ipv4Udp => "IPv4/UDP",
            Self::Ipv6Tcp => "IPv6/TCP",
            Self::Ipv6Udp => "IPv6/UDP",
            Self::Ipv4Ipv6Tcp => "IPv4+IPv6/TCP",
            Self::Ipv4Ipv6Udp => "IPv4+IPv6/UDP",
        };
        f.write_str(name)
    }
}

/// How the transport checksum is left in a finalized frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumMode {
    /// Zero the checksum field
    None,
    /// Compute the full checksum over pseudo header, transport header
    /// and payload
    Complete,
    /// Write only the folded pseudo-header sum; hardware or a later
    /// stage finishes the job
    PseudoHeader,
}

/// GSO context validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsoError {
    /// L3 offset leaves no room for an Ethernet header
    L3OffsetTooSmall,
    /// L4 offset does not lie after the L3 header start
    L4BeforeL3,
    /// Header end does not lie after the L4 header start
    HeaderEndBeforeL4,
    /// L3 header area below the protocol minimum
    L3HeaderTooShort,
    /// L4 header area below the protocol minimum
    L4HeaderTooShort,
    /// Zero maximum segment payload
    ZeroSegmentPayload,
    /// Frame carries no payload beyond the headers
    NoPayload,
    /// Frame payload smaller than one full segment - segmentation
    /// would be pointless
    PartialFirstSegment,
    /// IPv4/UDP segment payload cannot even hold the UDP header
    UdpSegmentTooSmall,
    /// Per-segment header length inconsistent with the total header
    /// length for this variant
    SegmentHeaderMismatch,
}

impl fmt::Display for GsoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L3OffsetTooSmall => write!(f, "L3 offset below Ethernet header size"),
            Self::L4BeforeL3 => write!(f, "L4 offset not after L3 offset"),
            Self::HeaderEndBeforeL4 => write!(f, "header end not after L4 offset"),
            Self::L3HeaderTooShort => write!(f, "L3 header below protocol minimum"),
            Self::L4HeaderTooShort => write!(f, "L4 header below protocol minimum"),
            Self::ZeroSegmentPayload => write!(f, "zero segment payload size"),
            Self::NoPayload => write!(f, "frame has no payload"),
            Self::PartialFirstSegment => write!(f, "frame smaller than one full segment"),
            Self::UdpSegmentTooSmall => write!(f, "segment payload below UDP header size"),
            Self::SegmentHeaderMismatch => {
                write!(f, "per-segment header length inconsistent with total")
            }
        }
    }
}

/// Segmentation context describing the header layout of one logical frame.
///
/// Built by the device model from the guest's offload request, validated
/// once per frame with [`GsoContext::is_valid`], then shared read-only by
/// every carve call. All offsets are from the start of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GsoContext {
    /// Protocol combination
    pub gso_type: GsoType,
    /// Offset of the (outer) L3 header
    pub l3_offset: u16,
    /// Offset of the TCP/UDP header; always after `l3_offset`
    pub l4_offset: u16,
    /// Offset of the payload in the first segment. For [`GsoType::Ipv4Udp`]
    /// this includes the one-time UDP header.
    pub total_header_len: u16,
    /// Header bytes repeated in segments after the first. Equals
    /// `total_header_len` for every type except [`GsoType::Ipv4Udp`],
    /// where later fragments carry no UDP header.
    pub seg_header_len: u16,
    /// Maximum payload bytes per wire segment (the offload MSS)
    pub max_seg_payload: u16,
}

impl GsoContext {
    /// Create a new context
    pub const fn new(
        gso_type: GsoType,
        l3_offset: u16,
        l4_offset: u16,
        total_header_len: u16,
        seg_header_len: u16,
        max_seg_payload: u16,
    ) -> Self {
        Self {
            gso_type,
            l3_offset,
            l4_offset,
            total_header_len,
            seg_header_len,
            max_seg_payload,
        }
    }

    /// Check the context against a concrete frame size.
    ///
    /// # Returns
    /// `Ok(())` if every carve operation may run on a frame of `frame_len`
    /// bytes, or the first violated constraint.
    pub fn check(&self, frame_len: usize) -> Result<(), GsoError> {
        if self.max_seg_payload == 0 {
            return Err(GsoError::ZeroSegmentPayload);
        }
        if self.l3() < ETHERNET_HEADER_SIZE {
            return Err(GsoError::L3OffsetTooSmall);
        }
        if self.l4() <= self.l3() {
            return Err(GsoError::L4BeforeL3);
        }
        if self.hdrs_total() <= self.l4() {
            return Err(GsoError::HeaderEndBeforeL4);
        }

        let min_l3 = if self.gso_type.is_ipv4() {
            IPV4_MIN_HEADER_SIZE
        } else if self.gso_type.is_ipv6() {
            IPV6_HEADER_SIZE
        } else {
            IPV4_MIN_HEADER_SIZE + IPV6_HEADER_SIZE
        };
        if self.l4() - self.l3() < min_l3 {
            return Err(GsoError::L3HeaderTooShort);
        }

        let min_l4 = if self.gso_type.is_tcp() {
            TCP_MIN_HEADER_SIZE
        } else {
            UDP_HEADER_SIZE
        };
        if self.hdrs_total() - self.l4() < min_l4 {
            return Err(GsoError::L4HeaderTooShort);
        }

        // Later segments repeat the full header area, except for IPv4/UDP
        // fragments which drop exactly the UDP header.
        let expected_seg = if self.gso_type == GsoType::Ipv4Udp {
            self.hdrs_total() - UDP_HEADER_SIZE
        } else {
            self.hdrs_total()
        };
        if self.hdrs_seg() != expected_seg {
            return Err(GsoError::SegmentHeaderMismatch);
        }

        if frame_len <= self.hdrs_total() {
            return Err(GsoError::NoPayload);
        }
        if frame_len - self.hdrs_total() < self.mss() {
            return Err(GsoError::PartialFirstSegment);
        }
        // The first IPv4/UDP payload window has to fit the UDP header.
        if self.gso_type == GsoType::Ipv4Udp && self.mss() < UDP_HEADER_SIZE {
            return Err(GsoError::UdpSegmentTooSmall);
        }

        Ok(())
    }

    /// Boolean form of [`GsoContext::check`]; never panics
    pub fn is_valid(&self, frame_len: usize) -> bool {
        self.check(frame_len).is_ok()
    }

    /// Largest frame a single carved segment can occupy.
    ///
    /// Useful for sizing per-segment transmit buffers.
    pub const fn max_segment_len(&self) -> usize {
        self.total_header_len as usize + self.max_seg_payload as usize
    }

    pub(crate) const fn l3(&self) -> usize {
        self.l3_offset as usize
    }

    pub(crate) const fn l4(&self) -> usize {
        self.l4_offset as usize
    }

    pub(crate) const fn hdrs_total(&self) -> usize {
        self.total_header_len as usize
    }

    pub(crate) const fn hdrs_seg(&self) -> usize {
        self.seg_header_len as usize
    }

    pub(crate) const fn mss(&self) -> usize {
        self.max_seg_payload as usize
    }
}
