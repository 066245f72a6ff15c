//! A [`Packet`] struct to read the fields of an MPEG Transport Stream packet

use std::fmt;

/// A Packet Identifier value, between `0x0000` and `0x1fff`.
///
/// PID values identify a particular sub-stream within the overall Transport Stream.
///
/// As returned by the [`Packet::pid`] method for example.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(u16);
impl Pid {
    /// The largest possible PID value, `0x1fff`.
    pub const MAX_VALUE: u16 = 0x1fff;

    /// Panics if the given value is greater than `Pid::MAX_VALUE`.
    pub const fn new(pid: u16) -> Pid {
        assert!(pid <= Self::MAX_VALUE);
        Pid(pid)
    }
}
impl From<Pid> for u16 {
    #[inline]
    fn from(pid: Pid) -> Self {
        pid.0
    }
}
impl fmt::Debug for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Pid({:04x})", self.0)
    }
}

const FIXED_HEADER_SIZE: usize = 4;
// when AF present, a 1-byte 'length' field precedes the content,
const ADAPTATION_FIELD_OFFSET: usize = FIXED_HEADER_SIZE + 1;

/// A transport stream `Packet` is a wrapper around a byte slice which allows the bytes to be
/// interpreted as a packet structure per _ISO/IEC 13818-1, Section 2.4.3.3_.
pub struct Packet<'buf> {
    buf: &'buf [u8],
}

impl<'buf> Packet<'buf> {
    /// The value `0x47`, which must appear in the first byte of every transport stream packet.
    pub const SYNC_BYTE: u8 = 0x47;

    /// The fixed 188 byte size of a transport stream packet.
    pub const SIZE: usize = 188;

    /// returns `true` if the given value is a valid synchronisation byte, the value
    /// `Packet::SYNC_BYTE` (0x47), which must appear at the start of every transport stream
    /// packet.
    #[inline(always)]
    pub fn is_sync_byte(b: u8) -> bool {
        b == Self::SYNC_BYTE
    }

    /// Wraps the buffer in a `Packet`, or returns `None` if the sync-byte does not have the
    /// correct value (callers treat such buffers as noise and skip to the next 188 bytes).
    ///
    /// Panics if the buffer size is not exactly `Packet::SIZE` (188) bytes.
    #[inline(always)]
    pub fn try_new(buf: &'buf [u8]) -> Option<Packet<'buf>> {
        assert_eq!(buf.len(), Self::SIZE);
        if Packet::is_sync_byte(buf[0]) {
            Some(Packet { buf })
        } else {
            None
        }
    }

    /// a structure larger than a single packet payload needs to be split across multiple packets,
    /// `payload_unit_start_indicator()` indicates if this packet payload contains the start of
    /// the structure.  If `false`, this packets payload is a continuation of a structure which
    /// began in an earlier packet within the transport stream.
    #[inline]
    pub fn payload_unit_start_indicator(&self) -> bool {
        self.buf[1] & 0b0100_0000 != 0
    }

    /// The sub-stream to which a particular packet belongs is indicated by this Packet Identifier
    /// value.
    #[inline]
    pub fn pid(&self) -> Pid {
        Pid(u16::from(self.buf[1] & 0b0001_1111) << 8 | u16::from(self.buf[2]))
    }

    /// `true` if an adaptation field is present between the fixed header and the payload.
    #[inline]
    pub fn has_adaptation_field(&self) -> bool {
        self.buf[3] & 0b0010_0000 != 0
    }

    fn adaptation_field_length(&self) -> usize {
        self.buf[4] as usize
    }

    /// Offset of the first payload byte within the packet buffer: 4 for the fixed header, plus
    /// the adaptation field and its 1-byte length when present.
    ///
    /// No bounds check is made here; a corrupt adaptation field length can place the offset at or
    /// beyond the end of the packet, and callers must validate before indexing (or use
    /// [`Packet::payload()`], which does).
    #[inline]
    pub fn payload_offset(&self) -> usize {
        if self.has_adaptation_field() {
            ADAPTATION_FIELD_OFFSET + self.adaptation_field_length()
        } else {
            FIXED_HEADER_SIZE
        }
    }

    /// The data contained within the packet, not including the packet headers.
    /// `None` is returned if the adaptation field consumes the whole packet.
    #[inline]
    pub fn payload(&self) -> Option<&'buf [u8]> {
        let offset = self.payload_offset();
        if offset < self.buf.len() {
            Some(&self.buf[offset..])
        } else {
            None
        }
    }

    /// borrow a reference to the underlying buffer of this packet
    pub fn buffer(&self) -> &'buf [u8] {
        self.buf
    }
}
