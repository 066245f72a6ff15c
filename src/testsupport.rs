//! Hand-assembled transport stream packets for exercising the scanning code in tests.

use crate::packet::Packet;

fn packet_header(pid: u16, payload_unit_start: bool) -> [u8; Packet::SIZE] {
    let mut buf = [0xffu8; Packet::SIZE];
    buf[0] = Packet::SYNC_BYTE;
    buf[1] = (pid >> 8) as u8 & 0b0001_1111;
    if payload_unit_start {
        buf[1] |= 0b0100_0000;
    }
    buf[2] = (pid & 0xff) as u8;
    buf[3] = 0b0001_0000; // payload only
    buf
}

/// Marker-bit interleaved encoding of a 33-bit timestamp, as it appears in a PES header.
pub fn encode_timestamp(ts: u64, prefix: u8) -> [u8; 5] {
    assert!(ts < 1 << 33);
    [
        (prefix << 4) | ((ts >> 29) as u8 & 0b0000_1110) | 1,
        (ts >> 22) as u8,
        ((ts >> 14) as u8 & 0b1111_1110) | 1,
        (ts >> 7) as u8,
        ((ts << 1) as u8 & 0b1111_1110) | 1,
    ]
}

/// A start-of-payload packet on the given PID whose PES header carries just a PTS.
pub fn video_packet(pid: u16, pts: u64) -> [u8; Packet::SIZE] {
    let mut buf = packet_header(pid, true);
    buf[4] = 0x00;
    buf[5] = 0x00;
    buf[6] = 0x01; // start code
    buf[7] = 0xe0; // stream_id: video
    buf[8] = 0;
    buf[9] = 0; // PES_packet_length: unbounded
    buf[10] = 0b1000_0000;
    buf[11] = 0b1000_0000; // PTS only
    buf[12] = 5; // PES_header_data_length
    buf[13..18].copy_from_slice(&encode_timestamp(pts, 0b0010));
    buf
}

/// A single-packet PAT section announcing one service.
pub fn pat_packet(program_number: u16) -> [u8; Packet::SIZE] {
    let mut buf = packet_header(0x0000, true);
    buf[4] = 0; // pointer_field
    let section = [
        0x00, // table_id
        0xb0,
        0x0d, // section_length: 13 (syntax header + one entry + CRC)
        0x12,
        0x34, // transport_stream_id
        0xc1,
        0x00,
        0x00,
        (program_number >> 8) as u8,
        (program_number & 0xff) as u8,
        0xe1,
        0x00, // program_map PID
        0x00,
        0x00,
        0x00,
        0x00, // CRC (not checked)
    ];
    buf[5..5 + section.len()].copy_from_slice(&section);
    buf
}

/// A single-packet TOT section for the given Modified Julian Date and time of day.
pub fn tot_packet(mjd: u16, hour: u8, minute: u8, second: u8) -> [u8; Packet::SIZE] {
    let mut buf = packet_header(0x0014, true);
    buf[4] = 0; // pointer_field
    let section = [
        0x73, // table_id
        0x70,
        0x07, // section_length: 7 (UTC_time + empty descriptor loop)
        (mjd >> 8) as u8,
        (mjd & 0xff) as u8,
        bcd(hour),
        bcd(minute),
        bcd(second),
        0xf0,
        0x00, // descriptors_loop_length: 0
    ];
    buf[5..5 + section.len()].copy_from_slice(&section);
    buf
}

/// A continuation packet carrying nothing decodable.
pub fn null_packet(pid: u16) -> [u8; Packet::SIZE] {
    packet_header(pid, false)
}

fn bcd(v: u8) -> u8 {
    assert!(v < 100);
    (v / 10) << 4 | (v % 10)
}
