//! Single forward passes over a transport stream: video PID discovery and construction of the
//! frame-index used to translate frame numbers into presentation timestamps.

use std::io;
use std::io::Read;
use std::ops::ControlFlow;

use log::debug;

use crate::packet::{Packet, Pid};
use crate::pes;
use crate::pes::Timestamp;
use crate::psi::pat;
use crate::psi::pat::PatSection;
use crate::psi::SectionCollector;

/// Packets per read; the chunk size must stay a whole multiple of the packet size so that chunk
/// boundaries never split a packet.
pub const CHUNK_PACKETS: usize = 10_000;

/// Number of packets examined from the start of the stream while guessing the video PID.
pub const PID_DETECT_PACKETS: usize = 5_000;

/// Lowest PID of the window conventionally carrying video elementary streams in the broadcast
/// multiplexes this crate targets, and the fallback guess when detection finds nothing.
pub const VIDEO_PID_MIN: Pid = Pid::new(0x100);

/// Highest PID of the video window.
pub const VIDEO_PID_MAX: Pid = Pid::new(0x1ff);

/// Result of the frame-index building pass.
pub struct StreamIndex {
    /// PTS of every start-of-payload packet on the video PID that carried a decodable timestamp,
    /// in arrival order.  Arrival order is decode order, which for streams with B-frames is not
    /// presentation order; frame numbers supplied by callers are taken to refer to stream
    /// position.
    pub frames: Vec<Timestamp>,
    /// The first non-zero program number announced by the Program Association Table, if any was
    /// seen.
    pub service_id: Option<u16>,
}

impl StreamIndex {
    /// The pair of timestamps bounding the given inclusive frame range.
    ///
    /// The end of the range uses the PTS of the frame *after* `end_frame` when one exists, so
    /// that the reported span covers the final frame's display duration; the last frame of the
    /// stream has no successor and falls back to its own PTS.
    pub fn boundary_pts(
        &self,
        start_frame: usize,
        end_frame: usize,
    ) -> Result<(Timestamp, Timestamp), crate::Error> {
        let total = self.frames.len();
        if start_frame >= total || end_frame >= total {
            return Err(crate::Error::FrameOutOfBounds {
                index: start_frame.max(end_frame),
                total,
            });
        }
        let start = self.frames[start_frame];
        let end = if end_frame + 1 < total {
            self.frames[end_frame + 1]
        } else {
            self.frames[end_frame]
        };
        Ok((start, end))
    }
}

/// Reads packet-aligned chunks from `src` and offers each sync-valid packet to `handle` until
/// the callback breaks or the input is exhausted.
///
/// Packets whose first byte is not the sync value are skipped entirely, as the cheap form of
/// resynchronisation after stream corruption.  A trailing partial packet at end of file is
/// dropped.
pub(crate) fn scan_packets<R, F>(mut src: R, mut handle: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(&Packet<'_>) -> ControlFlow<()>,
{
    let mut buf = vec![0u8; Packet::SIZE * CHUNK_PACKETS];
    loop {
        let filled = read_chunk(&mut src, &mut buf)?;
        if filled == 0 {
            return Ok(());
        }
        for raw in buf[..filled].chunks_exact(Packet::SIZE) {
            if let Some(pk) = Packet::try_new(raw) {
                if let ControlFlow::Break(()) = handle(&pk) {
                    return Ok(());
                }
            }
        }
        // a short chunk means end of file, since read_chunk() loops until the buffer fills
        if filled < buf.len() {
            return Ok(());
        }
    }
}

fn read_chunk<R: Read>(src: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Guesses which PID carries the video elementary stream by scanning a bounded prefix of the
/// stream ([`PID_DETECT_PACKETS`] packets) for the first PID within the video window whose packet
/// starts a PES payload with a decodable PTS.
///
/// Detection failure is not an error: the lower bound of the video window is returned as a
/// default guess, and a later frame-index pass over that PID will simply find nothing.
pub fn find_video_pid<R: Read>(src: R) -> io::Result<Pid> {
    let mut found = None;
    let mut remaining = PID_DETECT_PACKETS;
    scan_packets(src, |pk| {
        let pid = pk.pid();
        if (VIDEO_PID_MIN..=VIDEO_PID_MAX).contains(&pid)
            && pk.payload_unit_start_indicator()
            && pes::pts(pk).is_some()
        {
            found = Some(pid);
            return ControlFlow::Break(());
        }
        remaining -= 1;
        if remaining == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;
    match found {
        Some(pid) => {
            debug!("detected video stream on {:?}", pid);
            Ok(pid)
        }
        None => {
            debug!(
                "no video PID detected within the first {} packets; assuming {:?}",
                PID_DETECT_PACKETS,
                VIDEO_PID_MIN
            );
            Ok(VIDEO_PID_MIN)
        }
    }
}

/// Scans the whole stream and builds the [`StreamIndex`] for the given video PID.
///
/// While the service id is still unresolved, packets of the PAT PID are fed through a dedicated
/// [`SectionCollector`]; the first non-zero program number found stops further PAT processing
/// for the remainder of the pass.
pub fn build_index<R: Read>(src: R, video_pid: Pid) -> io::Result<StreamIndex> {
    let mut frames = Vec::new();
    let mut service_id = None;
    let mut pat_collector = SectionCollector::new();
    scan_packets(src, |pk| {
        let pid = pk.pid();
        if service_id.is_none() && pid == pat::PAT_PID {
            if let Some(section) = pat_collector.push(pk) {
                if let Some(pat) = PatSection::from_bytes(section) {
                    service_id = pat.first_program();
                    if let Some(sid) = service_id {
                        debug!("PAT announced service id {}", sid);
                    }
                }
            }
        }
        if pid == video_pid {
            if let Some(pts) = pes::pts(pk) {
                frames.push(pts);
            }
        }
        ControlFlow::Continue(())
    })?;
    Ok(StreamIndex { frames, service_id })
}
