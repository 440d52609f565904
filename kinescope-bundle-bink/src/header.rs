// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kinescope_core::errors::{decode_error, Result};
use kinescope_core::io::ReadBytes;

use bitflags::bitflags;
use log::debug;

/// The low 3 bytes of the magic word for a Bink 1 container ("BIK").
const BINK_V1_MAGIC: u32 = 0x004b_4942;
/// The low 3 bytes of the magic word for a Bink 2 container ("KB2").
const BINK_V2_MAGIC: u32 = 0x0032_424b;

/// Audio track flag: the track is stereo.
const AUDIO_FLAG_STEREO: u16 = 0x2000;
/// Audio track flag: the track uses the DCT transform rather than the RDFT.
const AUDIO_FLAG_DCT: u16 = 0x1000;

/// Hard cap on the channel count of a single audio track.
pub(crate) const MAX_AUDIO_CHANNELS: usize = 8;

bitflags! {
    /// Video flags from the fixed header.
    pub struct VideoFlags: u32 {
        /// The video carries an alpha plane.
        const ALPHA     = 0x0010_0000;
        /// The video is grayscale.
        const GRAYSCALE = 0x0002_0000;
    }
}

/// One audio track record from the container header.
#[derive(Clone, Debug)]
pub struct BinkAudioTrack {
    /// The container's identifier for the track.
    pub track_id: u32,
    /// The sample rate in Hz.
    pub sample_rate: u32,
    /// The number of channels, 1 or 2.
    pub channels: usize,
    /// Uses the DCT transform variant rather than the RDFT variant.
    pub use_dct: bool,
}

/// One entry of the frame offset table.
#[derive(Copy, Clone, Debug)]
pub struct BinkFrameEntry {
    /// The absolute byte offset of the frame.
    pub offset: u64,
    /// The size of the frame in bytes.
    pub size: u32,
    /// The frame is independently decodable.
    pub keyframe: bool,
}

/// The parsed fixed header, audio track table, and frame offset table of a Bink container.
#[derive(Clone, Debug)]
pub struct BinkHeader {
    /// The container major version, 1 or 2.
    pub version: u8,
    /// The container revision, an ASCII letter.
    pub sub_version: u8,
    /// The total size of the file in bytes.
    pub file_size: u64,
    /// The size of the largest frame in bytes.
    pub largest_frame_size: u32,
    /// The coded width in pixels.
    pub width: u32,
    /// The coded height in pixels.
    pub height: u32,
    /// The frame rate as a rational (numerator, denominator).
    pub frame_rate: (u32, u32),
    /// The video flags.
    pub flags: VideoFlags,
    /// The scaled-image mode, 0 to 15. The decoder exposes but does not apply it.
    pub scaling: u8,
    /// The audio track records.
    pub audio_tracks: Vec<BinkAudioTrack>,
    /// The frame offset table.
    pub frames: Vec<BinkFrameEntry>,
}

impl BinkHeader {
    /// Reads the fixed header, the audio track table, and the frame offset table.
    pub fn read<B: ReadBytes>(reader: &mut B) -> Result<BinkHeader> {
        let magic = reader.read_u32()?;

        let version = match magic & 0x00ff_ffff {
            BINK_V1_MAGIC => 1,
            BINK_V2_MAGIC => 2,
            _ => return decode_error("bink: invalid magic"),
        };

        let sub_version = (magic >> 24) as u8;

        let file_size = u64::from(reader.read_u32()?) + 8;
        let num_frames = reader.read_u32()?;
        let largest_frame_size = reader.read_u32()?;
        let _ = reader.read_u32()?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let fps_num = reader.read_u32()?;
        let fps_den = reader.read_u32()?;
        let video_flags = reader.read_u32()?;
        let num_audio_tracks = reader.read_u32()?;

        if num_frames == 0 || fps_den == 0 {
            return decode_error("bink: invalid header");
        }

        if num_frames > u32::MAX / 4 - 1 {
            return decode_error("bink: too many frames");
        }

        let flags = VideoFlags::from_bits_truncate(video_flags);
        let scaling = ((video_flags >> 28) & 0xf) as u8;

        debug!(
            "bink rev {} ({}x{} @ {}/{} fps, {} frames, {} audio tracks)",
            sub_version as char, width, height, fps_num, fps_den, num_frames, num_audio_tracks,
        );

        let audio_tracks = read_audio_tracks(reader, num_audio_tracks as usize)?;
        let frames = read_frame_table(reader, num_frames as usize)?;

        Ok(BinkHeader {
            version,
            sub_version,
            file_size,
            largest_frame_size,
            width,
            height,
            frame_rate: (fps_num, fps_den),
            flags,
            scaling,
            audio_tracks,
            frames,
        })
    }

    /// Returns true if the container revision is decodable.
    ///
    /// Revisions `d` through `i`, excluding `e`, of version 1 are supported.
    pub fn is_supported(&self) -> bool {
        self.version == 1
            && self.sub_version > b'c'
            && self.sub_version < b'j'
            && self.sub_version != b'e'
    }

    /// The number of frames in the container.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if frames carry an alpha plane.
    pub fn has_alpha(&self) -> bool {
        self.flags.contains(VideoFlags::ALPHA)
    }

    /// Returns true if the U and V planes are stored in swapped order.
    pub fn has_swapped_uv_planes(&self) -> bool {
        self.sub_version > b'c'
    }

    /// Returns true if the video is grayscale.
    pub fn is_grayscale(&self) -> bool {
        self.flags.contains(VideoFlags::GRAYSCALE)
    }
}

fn read_audio_tracks<B: ReadBytes>(reader: &mut B, count: usize) -> Result<Vec<BinkAudioTrack>> {
    if count > 256 {
        return decode_error("bink: too many audio tracks");
    }

    let mut rates = Vec::with_capacity(count);
    let mut flags = Vec::with_capacity(count);

    for _ in 0..count {
        rates.push(reader.read_u16()?);
        flags.push(reader.read_u16()?);
    }

    let mut tracks = Vec::with_capacity(count);

    for i in 0..count {
        let track_id = reader.read_u32()?;

        let channels = if flags[i] & AUDIO_FLAG_STEREO != 0 { 2 } else { 1 };

        tracks.push(BinkAudioTrack {
            track_id,
            sample_rate: u32::from(rates[i]),
            channels: channels.min(MAX_AUDIO_CHANNELS),
            use_dct: flags[i] & AUDIO_FLAG_DCT != 0,
        });
    }

    // The remainder of the 12 bytes-per-track table is not used.
    reader.ignore_bytes(4 * count as u64)?;

    Ok(tracks)
}

fn read_frame_table<B: ReadBytes>(reader: &mut B, count: usize) -> Result<Vec<BinkFrameEntry>> {
    // One offset per frame plus the end-of-frames offset.
    let mut raw = Vec::with_capacity(count + 1);

    for _ in 0..count + 1 {
        raw.push(reader.read_u32()?);
    }

    let mut frames = Vec::with_capacity(count);

    for pair in raw.windows(2) {
        let offset = pair[0] & !1;
        let next = pair[1] & !1;

        if next < offset {
            return decode_error("bink: frame table is not monotonic");
        }

        frames.push(BinkFrameEntry {
            offset: u64::from(offset),
            size: next - offset,
            keyframe: pair[0] & 1 != 0,
        });
    }

    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinescope_core::io::BufReader;

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn make_header(sub_version: u8) -> Vec<u8> {
        let mut buf = Vec::new();

        push_u32(&mut buf, u32::from_le_bytes([b'B', b'I', b'K', sub_version]));
        push_u32(&mut buf, 0x1000); // file size - 8
        push_u32(&mut buf, 2); // frames
        push_u32(&mut buf, 0x800); // largest frame
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 640);
        push_u32(&mut buf, 352);
        push_u32(&mut buf, 30);
        push_u32(&mut buf, 1);
        push_u32(&mut buf, 1 << 20); // alpha
        push_u32(&mut buf, 1); // audio tracks

        // Audio track table: rate + flags, track ids, unused.
        buf.extend_from_slice(&44100u16.to_le_bytes());
        buf.extend_from_slice(&(0x2000u16 | 0x1000).to_le_bytes());
        push_u32(&mut buf, 7);
        push_u32(&mut buf, 0);

        // Frame table: two frames, the first a keyframe.
        push_u32(&mut buf, 0x100 | 1);
        push_u32(&mut buf, 0x300);
        push_u32(&mut buf, 0x500);

        buf
    }

    #[test]
    fn verify_header_parse() {
        let buf = make_header(b'g');
        let header = BinkHeader::read(&mut BufReader::new(&buf)).unwrap();

        assert_eq!(header.version, 1);
        assert_eq!(header.sub_version, b'g');
        assert!(header.is_supported());
        assert_eq!(header.file_size, 0x1008);
        assert_eq!(header.width, 640);
        assert_eq!(header.height, 352);
        assert_eq!(header.frame_rate, (30, 1));
        assert!(header.has_alpha());
        assert!(!header.is_grayscale());
        assert!(header.has_swapped_uv_planes());
        assert_eq!(header.scaling, 0);

        assert_eq!(header.audio_tracks.len(), 1);
        assert_eq!(header.audio_tracks[0].track_id, 7);
        assert_eq!(header.audio_tracks[0].sample_rate, 44100);
        assert_eq!(header.audio_tracks[0].channels, 2);
        assert!(header.audio_tracks[0].use_dct);

        assert_eq!(header.frames.len(), 2);
        assert_eq!(header.frames[0].offset, 0x100);
        assert_eq!(header.frames[0].size, 0x200);
        assert!(header.frames[0].keyframe);
        assert_eq!(header.frames[1].offset, 0x300);
        assert_eq!(header.frames[1].size, 0x200);
        assert!(!header.frames[1].keyframe);
    }

    #[test]
    fn verify_unsupported_revisions() {
        for &(sub_version, supported) in
            &[(b'b', false), (b'c', false), (b'd', true), (b'e', false), (b'i', true)]
        {
            let buf = make_header(sub_version);
            let header = BinkHeader::read(&mut BufReader::new(&buf)).unwrap();
            assert_eq!(header.is_supported(), supported, "revision {}", sub_version as char);
        }
    }

    #[test]
    fn verify_invalid_magic() {
        let mut buf = make_header(b'g');
        buf[0] = b'X';

        assert!(BinkHeader::read(&mut BufReader::new(&buf)).is_err());
    }
}
