//! The subset of _Program Association Table_ parsing needed to discover the service ids of a
//! transport stream

use crate::packet::Pid;

/// The fixed PID on which Program Association Table sections are carried.
pub const PAT_PID: Pid = Pid::new(0x00);

/// The table id identifying a PAT section.
pub const PAT_TABLE_ID: u8 = 0x00;

// common header (3 bytes) plus table-syntax header (5 bytes) precede the program entries,
const PROGRAMS_OFFSET: usize = 8;
// and a CRC_32 trails them
const CRC_SIZE: usize = 4;

/// Sections of the _Program Association Table_ give details of the programs (services) within a
/// transport stream.  There may be only one program, or in the case of a broadcast multiplex,
/// there may be many.
#[derive(Clone, Debug)]
pub struct PatSection<'buf> {
    buf: &'buf [u8],
}
impl<'buf> PatSection<'buf> {
    /// Wraps a complete, reassembled section.  Returns `None` if the buffer is too short to hold
    /// the fixed PAT header or carries a table id other than [`PAT_TABLE_ID`].
    pub fn from_bytes(buf: &'buf [u8]) -> Option<PatSection<'buf>> {
        if buf.len() < PROGRAMS_OFFSET || buf[0] != PAT_TABLE_ID {
            return None;
        }
        Some(PatSection { buf })
    }

    /// Iterate over the program numbers in this section, in the order they appear.
    ///
    /// Entries with program number zero name the network PID rather than a service and are
    /// skipped.
    pub fn programs(&self) -> impl Iterator<Item = u16> + 'buf {
        let end = self
            .buf
            .len()
            .saturating_sub(CRC_SIZE)
            .max(PROGRAMS_OFFSET);
        ProgramIter {
            buf: &self.buf[PROGRAMS_OFFSET..end],
        }
    }

    /// The first service announced by this section, if it announces any.
    pub fn first_program(&self) -> Option<u16> {
        self.programs().next()
    }
}

/// Iterate over the list of programs in a `PatSection`.
struct ProgramIter<'buf> {
    buf: &'buf [u8],
}
impl<'buf> Iterator for ProgramIter<'buf> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        while self.buf.len() >= 4 {
            let (head, tail) = self.buf.split_at(4);
            self.buf = tail;
            let program_number = u16::from(head[0]) << 8 | u16::from(head[1]);
            if program_number != 0 {
                return Some(program_number);
            }
        }
        None
    }
}
