//! Command-line tool reporting the broadcast wall-clock time of trim ranges within an MPEG
//! transport stream recording.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::Parser;

use tstot::analyzer;
use tstot::avs;
use tstot::correlate;
use tstot::packet::Pid;
use tstot::pes::Timestamp;
use tstot::report::{self, Report, Segment};
use tstot::Error;

#[derive(Parser, Debug)]
#[command(
    name = "tstot",
    version,
    about = "Report TOT wall-clock timestamps for trim ranges of an MPEG-TS recording"
)]
struct Args {
    /// Input transport stream file
    #[arg(short, long)]
    input: PathBuf,

    /// AVS script containing Trim() ranges; without one the full video duration is reported
    #[arg(short, long)]
    avs: Option<PathBuf>,

    /// Write the segment report as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    println!("Analyzing video stream...");
    let video_pid = analyzer::find_video_pid(File::open(&args.input)?)?;
    println!("  Video PID: 0x{:x}", u16::from(video_pid));

    let index = analyzer::build_index(File::open(&args.input)?, video_pid)?;
    let total_frames = index.frames.len();
    println!("  Total frames: {}", total_frames);
    if total_frames == 0 {
        return Err(Error::NoVideoFrames(video_pid));
    }

    let trim_ranges = match &args.avs {
        Some(path) => {
            println!("Parsing AVS file: {}", path.display());
            let ranges = avs::trim_ranges(path)?;
            if ranges.is_empty() {
                return Err(Error::NoTrimRanges(path.clone()));
            }
            println!("  Found {} trim ranges", ranges.len());
            ranges
        }
        None => {
            println!("No AVS file specified. Processing full video duration.");
            vec![(0, total_frames - 1)]
        }
    };

    if let Some(sid) = index.service_id {
        println!("  Service ID: {} (0x{:x})", sid, sid);
    }
    println!();

    let mut segments = Vec::with_capacity(trim_ranges.len());
    for (i, &(start_frame, end_frame)) in trim_ranges.iter().enumerate() {
        if args.avs.is_some() {
            println!("Segment {}: frames [{}, {}]", i + 1, start_frame, end_frame);
        } else {
            println!("Full Video: frames [{}, {}]", start_frame, end_frame);
        }

        // bounds are validated before any correlation scan is attempted
        let (start_pts, end_pts) = index.boundary_pts(start_frame, end_frame)?;
        let start_tot = resolve(&args.input, video_pid, start_pts, start_frame)?;
        let end_tot = resolve(&args.input, video_pid, end_pts, end_frame)?;

        let start_str = report::format_timestamp(start_tot);
        let end_str = report::format_timestamp(end_tot);
        let duration = report::duration_secs(start_tot, end_tot);
        println!("  Start TOT: {}", start_str);
        println!("  End TOT:   {}", end_str);
        println!("  Duration:  {} seconds", duration);
        println!();

        segments.push(Segment {
            index: i + 1,
            frames: [start_frame, end_frame],
            start_tot: start_str,
            end_tot: end_str,
            duration_sec: duration,
        });
    }

    if let Some(out) = &args.output {
        let rpt = Report {
            input_file: args.input.display().to_string(),
            avs_file: args.avs.as_ref().map(|p| p.display().to_string()),
            sid: index.service_id,
            segments,
        };
        std::fs::write(out, serde_json::to_string_pretty(&rpt)?)?;
        println!("JSON output written to: {}", out.display());
    }
    Ok(())
}

/// One correlation scan over the input file for a single boundary.
fn resolve(
    input: &Path,
    video_pid: Pid,
    target: Timestamp,
    frame: usize,
) -> Result<NaiveDateTime, Error> {
    correlate::wallclock_at(
        File::open(input)?,
        video_pid,
        target,
        correlate::DEFAULT_SEARCH_WINDOW,
    )?
    .ok_or(Error::TotUnresolved { frame })
}
