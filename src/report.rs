//! The per-run report of resolved segments, and its JSON form.

use chrono::NaiveDateTime;
use serde::Serialize;

/// One resolved trim range.
#[derive(Debug, Serialize)]
pub struct Segment {
    /// 1-based position of this segment within the run
    pub index: usize,
    /// the inclusive frame range requested, `[start_frame, end_frame]`
    pub frames: [usize; 2],
    /// wall-clock time of the first frame, `YYYY-MM-DD HH:MM:SS.mmm`
    pub start_tot: String,
    /// wall-clock time of the end of the last frame, same format
    pub end_tot: String,
    /// segment length in seconds, rounded to milliseconds
    pub duration_sec: f64,
}

/// The whole run, as written to the JSON output file.
#[derive(Debug, Serialize)]
pub struct Report {
    /// path of the transport stream that was analysed
    pub input_file: String,
    /// path of the trim-spec script, when one was supplied
    pub avs_file: Option<String>,
    /// service id announced by the PAT, when one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<u16>,
    /// the resolved segments, in request order
    pub segments: Vec<Segment>,
}

/// Formats a wall-clock time the way the report records it: broadcast-local
/// `YYYY-MM-DD HH:MM:SS.mmm`, no timezone designator.
pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Span between the two times in seconds, rounded to milliseconds.
pub fn duration_secs(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}
