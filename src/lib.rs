//! Parsing and time-correlation for MPEG2 Transport Stream recordings, with a focus on
//! recovering broadcast wall-clock timestamps from the DVB _Time Offset Table_ (TOT).
//!
//! The library supports a single workflow:
//!
//!  1. [`analyzer::find_video_pid()`] guesses which PID carries the video elementary stream by
//!     probing a bounded prefix of the recording.
//!  2. [`analyzer::build_index()`] makes one forward pass over the recording and produces a
//!     [`analyzer::StreamIndex`]: the PTS of every video access unit in arrival order, plus the
//!     service id announced by the _Program Association Table_.
//!  3. [`correlate::wallclock_at()`] maps a PTS of interest to an absolute date-time by scanning
//!     for the nearest TOT packet and projecting along the 90kHz PES clock.
//!
//! # Design principals
//!
//!  * *Avoid copying and allocating* if possible.  Packet and section accessors borrow slices of
//!    the underlying byte buffer; the only buffering happens when a PSI section spans packets.
//!  * *Tolerate damage*.  Broadcast captures contain corrupt packets; anything that does not
//!    parse simply yields no value, and the scan moves on to the next packet.
//!  * *Transport Neutral*.  The scanning entry-points accept any `std::io::Read`; the bundled
//!    command-line tool reads plain files, but nothing here requires seekable input.
//!
//! Scans are sequential and deterministic: for a fixed input and target PTS the answer is always
//! the same.

pub mod analyzer;
pub mod avs;
pub mod correlate;
pub mod packet;
pub mod pes;
pub mod psi;
pub mod report;

#[cfg(test)]
pub(crate) mod testsupport;

use std::path::PathBuf;

/// Fatal problems surfaced to the caller; recoverable parse gaps never appear here, they are
/// simply absent values consumed by continuing the scan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failure reading the transport stream or writing the report
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Failure serialising the JSON report
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The frame-index pass produced no frames at all for the selected PID
    #[error("no video frames found on {0:?}")]
    NoVideoFrames(packet::Pid),
    /// A requested frame index does not exist in the stream
    #[error("frame index {index} out of bounds (stream has {total} frames)")]
    FrameOutOfBounds {
        /// the offending frame index
        index: usize,
        /// the number of frames actually present
        total: usize,
    },
    /// No TOT packet could be decoded near the given frame's presentation time
    #[error("no TOT timestamp could be resolved near frame {frame}")]
    TotUnresolved {
        /// the frame whose boundary was being resolved
        frame: usize,
    },
    /// The supplied trim-spec file contained no `Trim()` ranges
    #[error("no Trim() ranges found in {}", .0.display())]
    NoTrimRanges(PathBuf),
}
