// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::VecDeque;

use kinescope_core::audio::Channels;
use kinescope_core::codecs::{
    AudioCodecParameters, CodecParameters, VideoCodecParameters, CODEC_TYPE_BINK_AUDIO_DCT,
    CODEC_TYPE_BINK_AUDIO_RDFT, CODEC_TYPE_BINK_VIDEO,
};
use kinescope_core::errors::{decode_error, Result};
use kinescope_core::formats::{FormatOptions, FormatReader, Packet, Track};
use kinescope_core::io::{BufReader, MediaSourceStream, ReadBytes};

use log::{debug, warn};

use super::header::BinkHeader;

/// The track id of the video track. Audio tracks follow in container order.
pub const VIDEO_TRACK_ID: u32 = 0;

/// Bink 1 container reader.
///
/// `BinkReader` implements a demuxer for the Bink 1 container. A frame body interleaves one
/// payload per audio track followed by the video payload; the reader slices each frame and emits
/// its payloads as packets in that order.
pub struct BinkReader {
    reader: MediaSourceStream,
    header: BinkHeader,
    tracks: Vec<Track>,
    /// Packets of the current frame not yet emitted.
    queue: VecDeque<Packet>,
    /// Index of the next frame to slice.
    next_frame: usize,
    /// Running per-audio-track sample counts.
    audio_ts: Vec<u64>,
}

impl BinkReader {
    /// Gets the parsed container header.
    ///
    /// The header is available even when the container revision is unsupported; such a reader
    /// produces no packets.
    pub fn header(&self) -> &BinkHeader {
        &self.header
    }

    /// The number of frames remaining.
    pub fn frames_remaining(&self) -> usize {
        self.header.num_frames().saturating_sub(self.next_frame)
    }

    /// Slices the next frame body into its per-track packets.
    fn read_frame(&mut self) -> Result<()> {
        let frame_idx = self.next_frame;
        let entry = self.header.frames[frame_idx];

        self.reader.seek(entry.offset)?;

        let body = self.reader.read_boxed_slice_exact(entry.size as usize)?;
        let mut body = BufReader::new(&body);

        self.next_frame += 1;

        for (i, track) in self.header.audio_tracks.iter().enumerate() {
            let track_size = body.read_u32()? as usize;

            if track_size > body.bytes_available() {
                return decode_error("bink: audio payload exceeds frame");
            }

            if track_size > 3 {
                // The sample count is the decoded payload size in bytes.
                let num_samples = body.read_u32()?;
                let payload = body.read_buf_bytes_ref(track_size - 4)?;

                if track_size > 4 {
                    let samples_per_channel = u64::from(num_samples) / 2 / track.channels as u64;

                    let mut packet = Packet::new_from_slice(
                        i as u32 + 1,
                        self.audio_ts[i],
                        samples_per_channel,
                        payload,
                    );
                    packet.keyframe = entry.keyframe;

                    self.audio_ts[i] += samples_per_channel;
                    self.queue.push_back(packet);
                }
            }
            else {
                body.ignore_bytes(track_size as u64)?;
            }
        }

        // The remainder of the frame body is the video payload.
        let payload = body.read_buf_bytes_available_ref();

        let mut packet = Packet::new_from_slice(VIDEO_TRACK_ID, frame_idx as u64, 1, payload);
        packet.keyframe = entry.keyframe;

        self.queue.push_back(packet);

        Ok(())
    }
}

impl FormatReader for BinkReader {
    fn try_new(mut source: MediaSourceStream, options: &FormatOptions) -> Result<Self> {
        let header = BinkHeader::read(&mut source)?;

        if options.validate_index {
            if let Some(len) = source.byte_len() {
                let end = header.frames.last().map(|f| f.offset + u64::from(f.size));

                if end.map_or(false, |end| end > len) {
                    return decode_error("bink: frame table exceeds source");
                }
            }
        }

        if !header.is_supported() {
            warn!(
                "bink: unsupported container (version {}, revision {})",
                header.version, header.sub_version as char,
            );
        }

        let mut tracks = Vec::new();

        let video_extra: Vec<u8> = std::iter::once(header.sub_version)
            .chain(header.flags.bits().to_le_bytes().iter().copied())
            .collect();

        let video_params = VideoCodecParameters::new(
            CODEC_TYPE_BINK_VIDEO,
            header.width,
            header.height,
        )
        .with_frame_rate(header.frame_rate.0, header.frame_rate.1)
        .with_extra_data(video_extra.into_boxed_slice());

        tracks.push(Track::new(VIDEO_TRACK_ID, CodecParameters::Video(video_params)));

        for (i, audio) in header.audio_tracks.iter().enumerate() {
            let codec =
                if audio.use_dct { CODEC_TYPE_BINK_AUDIO_DCT } else { CODEC_TYPE_BINK_AUDIO_RDFT };

            let channels = Channels::from_count(audio.channels)
                .unwrap_or(Channels::FRONT_LEFT);

            let params = AudioCodecParameters::new(codec, audio.sample_rate, channels)
                .with_extra_data(Box::new([header.sub_version]));

            tracks.push(Track::new(i as u32 + 1, CodecParameters::Audio(params)));
        }

        debug!("bink: {} tracks, {} frames", tracks.len(), header.num_frames());

        let num_audio = header.audio_tracks.len();

        Ok(BinkReader {
            reader: source,
            header,
            tracks,
            queue: VecDeque::new(),
            next_frame: 0,
            audio_ts: vec![0; num_audio],
        })
    }

    fn next_packet(&mut self) -> Result<Option<Packet>> {
        // An unsupported container exposes its header but produces no packets.
        if !self.header.is_supported() {
            return Ok(None);
        }

        while self.queue.is_empty() {
            if self.next_frame >= self.header.num_frames() {
                return Ok(None);
            }

            self.read_frame()?;
        }

        Ok(self.queue.pop_front())
    }

    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn reset(&mut self) -> Result<()> {
        self.queue.clear();
        self.next_frame = 0;

        for ts in self.audio_ts.iter_mut() {
            *ts = 0;
        }

        Ok(())
    }

    fn into_inner(self) -> MediaSourceStream {
        self.reader
    }
}
