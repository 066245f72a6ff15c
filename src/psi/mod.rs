//! Collection of PSI/SI table sections, which may be split across several transport stream
//! packets.
//!
//! # Concepts
//!
//! * A PSI *Section* begins at a `pointer_field` offset within the payload of a packet whose
//!   `payload_unit_start_indicator` is set, and continues through the payloads of following
//!   packets on the same PID until the length declared in its header has been accumulated.
//! * [`SectionCollector`] performs that reassembly.  One collector instance serves exactly one
//!   PID; feeding it packets of several PIDs would interleave unrelated payload bytes.
//! * The specific table types are decoded elsewhere: [`pat`] for the _Program Association
//!   Table_, [`tot`] for the _Time Offset Table_.

pub mod pat;
pub mod tot;

use crate::packet::Packet;

/// Bytes of section header covered by the fields preceding `section_length` plus the length
/// field itself; the declared length counts the bytes which follow these.
const HEADER_SIZE: usize = 3;

/// Reassembles the sections of a single PID, one at a time.
///
/// Feed every packet of the PID to [`SectionCollector::push()`] in arrival order.  Truncated or
/// malformed packets never fail loudly; the collector just keeps waiting, and a new
/// start-of-payload packet implicitly discards whatever partial section came before it.
pub struct SectionCollector {
    buf: Vec<u8>,
    collecting: bool,
    declared_len: usize,
}

impl Default for SectionCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionCollector {
    /// Creates a collector in the idle state with an empty buffer.
    pub fn new() -> SectionCollector {
        SectionCollector {
            buf: Vec::new(),
            collecting: false,
            declared_len: 0,
        }
    }

    /// Adds the payload of the given packet to the section under construction, returning the
    /// complete section bytes once the declared `section_length` has been accumulated.
    pub fn push(&mut self, pk: &Packet<'_>) -> Option<&[u8]> {
        if pk.payload_unit_start_indicator() {
            self.buf.clear();
            self.collecting = true;
            self.declared_len = 0;
            let payload = pk.payload()?;
            let pointer = usize::from(payload[0]);
            if 1 + pointer >= payload.len() {
                // pointer skips past the end of this packet; wait for the next section start
                return None;
            }
            let section = &payload[1 + pointer..];
            if section.len() >= HEADER_SIZE {
                self.declared_len = ((usize::from(section[1] & 0b0000_1111) << 8)
                    | usize::from(section[2]))
                    + HEADER_SIZE;
            }
            self.buf.extend_from_slice(section);
        } else if self.collecting {
            if let Some(payload) = pk.payload() {
                self.buf.extend_from_slice(payload);
            }
        }
        if self.collecting && self.declared_len > 0 && self.buf.len() >= self.declared_len {
            self.collecting = false;
            Some(&self.buf[..self.declared_len])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::packet::Packet;

    fn start_packet(section: &[u8], pointer: u8) -> [u8; Packet::SIZE] {
        let mut buf = [0xffu8; Packet::SIZE];
        buf[0] = Packet::SYNC_BYTE;
        buf[1] = 0b0100_0000;
        buf[2] = 0;
        buf[3] = 0b0001_0000;
        buf[4] = pointer;
        let start = 5 + pointer as usize;
        if start < Packet::SIZE {
            let end = (start + section.len()).min(Packet::SIZE);
            buf[start..end].copy_from_slice(&section[..end - start]);
        }
        buf
    }

    fn continuation_packet(section: &[u8]) -> [u8; Packet::SIZE] {
        let mut buf = [0xffu8; Packet::SIZE];
        buf[0] = Packet::SYNC_BYTE;
        buf[1] = 0;
        buf[2] = 0;
        buf[3] = 0b0001_0000;
        let end = (4 + section.len()).min(Packet::SIZE);
        buf[4..end].copy_from_slice(&section[..end - 4]);
        buf
    }

    fn section_of_length(total: usize) -> Vec<u8> {
        assert!(total > HEADER_SIZE);
        let declared = total - HEADER_SIZE;
        let mut section: Vec<u8> = (0..total).map(|i| i as u8).collect();
        section[1] = 0b0111_0000 | (declared >> 8) as u8;
        section[2] = (declared & 0xff) as u8;
        section
    }

    #[test]
    fn single_packet_section() {
        let section = section_of_length(20);
        let buf = start_packet(&section, 0);
        let pk = Packet::try_new(&buf[..]).unwrap();
        let mut collector = SectionCollector::new();
        assert_eq!(collector.push(&pk), Some(&section[..]));
    }

    #[test]
    fn pointer_field_skips_filler() {
        let section = section_of_length(20);
        let buf = start_packet(&section, 7);
        let pk = Packet::try_new(&buf[..]).unwrap();
        let mut collector = SectionCollector::new();
        assert_eq!(collector.push(&pk), Some(&section[..]));
    }

    #[test]
    fn section_spanning_three_packets() {
        let section = section_of_length(300);

        // an adaptation field of 80 bytes leaves 103 bytes of payload per packet, so the
        // 300-byte section needs three packets to accumulate
        let mut packets: Vec<[u8; Packet::SIZE]> = Vec::new();
        let mut first = start_packet(&section[..0], 0);
        first[3] = 0b0011_0000;
        first[4] = 80; // adaptation_field_length
        first[85] = 0; // pointer_field
        first[86..188].copy_from_slice(&section[..102]);
        packets.push(first);
        for chunk in section[102..].chunks(103) {
            let mut pk = [0xffu8; Packet::SIZE];
            pk[0] = Packet::SYNC_BYTE;
            pk[1] = 0;
            pk[2] = 0;
            pk[3] = 0b0011_0000;
            pk[4] = 80;
            pk[85..85 + chunk.len()].copy_from_slice(chunk);
            packets.push(pk);
        }
        assert_eq!(packets.len(), 3);

        let mut collector = SectionCollector::new();
        let mut emitted = None;
        for (i, raw) in packets.iter().enumerate() {
            let pk = Packet::try_new(&raw[..]).unwrap();
            match collector.push(&pk) {
                Some(complete) => {
                    assert_eq!(i, packets.len() - 1);
                    emitted = Some(complete.to_vec());
                }
                None => assert!(i < packets.len() - 1),
            }
        }
        assert_eq!(emitted.as_deref(), Some(&section[..]));
    }

    #[test]
    fn new_start_discards_partial_section() {
        let long_section = section_of_length(300);
        let short_section = section_of_length(16);
        let mut collector = SectionCollector::new();
        let first = start_packet(&long_section[..183], 0);
        assert_eq!(
            collector.push(&Packet::try_new(&first[..]).unwrap()),
            None
        );
        // a new payload-unit start resets the collector before the long section completes
        let second = start_packet(&short_section, 0);
        assert_eq!(
            collector.push(&Packet::try_new(&second[..]).unwrap()),
            Some(&short_section[..])
        );
    }

    #[test]
    fn continuation_while_idle_is_ignored() {
        let section = section_of_length(20);
        let buf = continuation_packet(&section);
        let pk = Packet::try_new(&buf[..]).unwrap();
        let mut collector = SectionCollector::new();
        assert_eq!(collector.push(&pk), None);
    }

    #[test]
    fn pointer_beyond_payload_yields_nothing() {
        let section = section_of_length(20);
        let buf = start_packet(&section, 0xff);
        let pk = Packet::try_new(&buf[..]).unwrap();
        let mut collector = SectionCollector::new();
        assert_eq!(collector.push(&pk), None);
    }
}
