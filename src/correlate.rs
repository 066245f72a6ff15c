//! Correlation of a presentation timestamp with the broadcast wall-clock time carried in nearby
//! _Time Offset Table_ packets.
//!
//! Each query makes its own forward scan of the stream; with the handful of queries a typical
//! run makes (two per trim range) this is cheaper to reason about than an occurrence index, and
//! it keeps the answer deterministic for a fixed input.

use std::io;
use std::io::Read;
use std::ops::ControlFlow;

use chrono::{Duration, NaiveDateTime};
use log::debug;

use crate::analyzer::scan_packets;
use crate::packet::Pid;
use crate::pes;
use crate::pes::Timestamp;
use crate::psi::tot;
use crate::psi::SectionCollector;

/// How many packets past the target the scan keeps looking for a TOT before settling for the
/// best anchor already seen.
pub const DEFAULT_SEARCH_WINDOW: usize = 50_000;

/// The most recent successfully decoded TOT, together with the video PTS that was current when
/// it appeared.  The PTS may be absent when the TOT preceded the first timestamped video packet.
struct Anchor {
    time: NaiveDateTime,
    video_pts: Option<Timestamp>,
}

/// Maps `target` (a PTS on `video_pid`'s 90kHz clock) to an absolute wall-clock time.
///
/// The scan tracks the most recent video PTS and the most recent decodable TOT (later TOTs
/// overwrite earlier ones).  Once the video stream reaches the target, the first available
/// anchor produces the answer by linear projection along the nominal 90kHz clock:
/// `tot_time + (target - anchor_pts) / 90000` seconds.  If no anchor with a usable PTS turns up
/// within `search_window` further packets, or the file ends first, the best TOT time seen is
/// returned as-is; `None` means no TOT was ever decoded.
///
/// The projection assumes a constant clock rate between anchor and target, which holds for the
/// sub-second to low-second gaps between TOT repetitions but degrades across clock
/// discontinuities.
pub fn wallclock_at<R: Read>(
    src: R,
    video_pid: Pid,
    target: Timestamp,
    search_window: usize,
) -> io::Result<Option<NaiveDateTime>> {
    let mut last_video_pts: Option<Timestamp> = None;
    let mut anchor: Option<Anchor> = None;
    let mut target_found = false;
    let mut packets_since_target = 0usize;
    let mut answer: Option<NaiveDateTime> = None;
    let mut tot_collector = SectionCollector::new();

    scan_packets(src, |pk| {
        let pid = pk.pid();
        if pid == video_pid && pk.payload_unit_start_indicator() {
            if let Some(pts) = pes::pts(pk) {
                last_video_pts = Some(pts);
                if pts >= target {
                    target_found = true;
                }
            }
        }
        if pid == tot::TOT_PID {
            if let Some(section) = tot_collector.push(pk) {
                if let Some(time) = tot::decode(section) {
                    anchor = Some(Anchor {
                        time,
                        video_pts: last_video_pts,
                    });
                }
            }
        }
        if target_found {
            packets_since_target += 1;
            if let Some(a) = &anchor {
                if let Some(anchor_pts) = a.video_pts {
                    answer = Some(project(a.time, anchor_pts, target));
                    return ControlFlow::Break(());
                }
            }
            if packets_since_target > search_window {
                debug!(
                    "no TOT within {} packets of target PTS {}; using the last one seen",
                    search_window,
                    target.value()
                );
                answer = anchor.as_ref().map(|a| a.time);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    })?;

    if answer.is_none() {
        // end of file before the window closed: project from the best anchor available, or
        // report its time plain when it never coincided with a video PTS
        answer = anchor.map(|a| match a.video_pts {
            Some(anchor_pts) => project(a.time, anchor_pts, target),
            None => a.time,
        });
    }
    Ok(answer)
}

/// Linear projection from the anchor to the target along the 90kHz clock, at microsecond
/// granularity (exact for everything the millisecond output format can express).
fn project(time: NaiveDateTime, anchor_pts: Timestamp, target: Timestamp) -> NaiveDateTime {
    let delta = target.value() as i64 - anchor_pts.value() as i64;
    time + Duration::microseconds(delta * 1_000_000 / Timestamp::TIMEBASE as i64)
}
