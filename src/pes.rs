//! Extraction of Presentation and Decode Time Stamps from _Packetized Elementary Stream_ headers
//! found at the start of transport stream packet payloads.
//!
//! Only the timestamp fields of the PES header are interpreted; the elementary stream content
//! itself is never touched.  Anything that does not look like a well-formed PES header simply
//! produces [`PtsDts::None`], since a scan over a broadcast capture will offer plenty of packets
//! that are not PES at all.

use crate::packet::Packet;

/// Detail about the formatting problem which prevented a [`Timestamp`] value being parsed.
#[derive(PartialEq, Eq, Debug)]
pub enum TimestampError {
    /// There were not enough bytes remaining in the packet to hold the timestamp
    NotEnoughData {
        /// the number of bytes required to hold the timestamp
        requested: usize,
        /// the number of bytes actually remaining
        available: usize,
    },
}

/// A 33-bit Elementary Stream timestamp, used to represent PTS and DTS values which may appear in
/// an Elementary Stream header.
///
/// Note that the 33-bit value wraps around roughly every 26.5 hours; this crate performs no
/// wrap-around correction, and all arithmetic assumes the values of one run fall within a single
/// non-wrapping epoch.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy)]
pub struct Timestamp {
    val: u64,
}
impl Timestamp {
    /// The largest representable timestamp value before the timestamp wraps back around to zero.
    pub const MAX: Timestamp = Timestamp { val: (1 << 33) - 1 };

    /// 90kHz timebase in which PTS and DTS values are measured.
    pub const TIMEBASE: u64 = 90_000;

    const SIZE: usize = 5;

    /// Parse a timestamp value from the 5 bytes at the start of the given slice, discarding the
    /// interleaved marker bits (they are not validated; damaged markers do not stop a stream's
    /// timestamps being useful).
    ///
    /// Panics if fewer than 5 bytes are given.
    pub fn from_bytes(buf: &[u8]) -> Timestamp {
        Timestamp {
            val: (u64::from(buf[0] & 0b0000_1110) << 29)
                | u64::from(buf[1]) << 22
                | (u64::from(buf[2] & 0b1111_1110) << 14)
                | u64::from(buf[3]) << 7
                | u64::from(buf[4]) >> 1,
        }
    }

    /// Panics if the given val is greater than 2^33-1
    pub fn from_u64(val: u64) -> Timestamp {
        assert!(val < 1 << 33);
        Timestamp { val }
    }

    /// produces the timestamp's value (only the low 33 bits are used)
    pub fn value(self) -> u64 {
        self.val
    }
}

/// Contains some combination of PTS and DTS timestamps (or maybe neither).
///
/// Per _ISO/IEC 13818-1_ the `pts_dts_flags` field may declare no timestamps, a PTS alone, or
/// both PTS and DTS; the remaining bit pattern is invalid.
#[derive(PartialEq, Eq, Debug)]
pub enum PtsDts {
    /// There are no timestamps present (or the header was malformed / truncated)
    None,
    /// Only Presentation Time Stamp is present
    PtsOnly(Timestamp),
    /// the _pts_dts_flags_ field contained the invalid value `0b01`
    Invalid,
    /// Both Presentation and Decode Time Stamps are present
    Both {
        /// Presentation Time Stamp
        pts: Timestamp,
        /// Decode Time Stamp
        dts: Timestamp,
    },
}
impl PtsDts {
    /// the Presentation Time Stamp, however it was flagged, if one was decoded
    pub fn pts(&self) -> Option<Timestamp> {
        match *self {
            PtsDts::PtsOnly(pts) | PtsDts::Both { pts, .. } => Some(pts),
            PtsDts::None | PtsDts::Invalid => None,
        }
    }
}

// PES header layout relative to the packet's payload offset:
//   0..3  packet_start_code_prefix (00 00 01)
//   3     stream_id
//   4..6  PES_packet_length
//   6     check bits / scrambling / priority flags
//   7     PTS_DTS_flags (top 2 bits) and friends
//   8     PES_header_data_length
//   9..   optional fields (PTS first, then DTS)
const HEADER_ROOM: usize = 9;

/// Extracts whatever timestamps the given packet carries in a PES header at the start of its
/// payload.
///
/// Produces [`PtsDts::None`] unless the packet starts a payload unit, has room for the fixed PES
/// header, carries the `00 00 01` start code, and declares a header extension region that fits
/// within the packet.  When both PTS and DTS are flagged but the data for either is truncated,
/// the result is also `PtsDts::None`: a half-decoded pair is worse than none.
pub fn timestamps(pk: &Packet<'_>) -> PtsDts {
    if !pk.payload_unit_start_indicator() {
        return PtsDts::None;
    }
    let buf = pk.buffer();
    let offset = pk.payload_offset();
    if offset + HEADER_ROOM > buf.len() {
        return PtsDts::None;
    }
    if buf[offset] != 0x00 || buf[offset + 1] != 0x00 || buf[offset + 2] != 0x01 {
        return PtsDts::None;
    }
    let pts_dts_flags = buf[offset + 7] >> 6;
    let header_data_len = buf[offset + 8] as usize;
    let cursor = offset + HEADER_ROOM;
    if cursor + header_data_len > buf.len() {
        return PtsDts::None;
    }
    match pts_dts_flags {
        0b00 => PtsDts::None,
        0b01 => PtsDts::Invalid,
        0b10 => match timestamp_at(buf, cursor) {
            Ok(pts) => PtsDts::PtsOnly(pts),
            Err(_) => PtsDts::None,
        },
        0b11 => match (
            timestamp_at(buf, cursor),
            timestamp_at(buf, cursor + Timestamp::SIZE),
        ) {
            (Ok(pts), Ok(dts)) => PtsDts::Both { pts, dts },
            _ => PtsDts::None,
        },
        v => panic!("unexpected pts_dts_flags value {}", v),
    }
}

/// Convenience for callers that only care about presentation time.
pub fn pts(pk: &Packet<'_>) -> Option<Timestamp> {
    timestamps(pk).pts()
}

fn timestamp_at(buf: &[u8], pos: usize) -> Result<Timestamp, TimestampError> {
    if pos + Timestamp::SIZE > buf.len() {
        return Err(TimestampError::NotEnoughData {
            requested: Timestamp::SIZE,
            available: buf.len().saturating_sub(pos),
        });
    }
    Ok(Timestamp::from_bytes(&buf[pos..pos + Timestamp::SIZE]))
}
