// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kinescope_core::audio::{DecodedAudio, SignalSpec};
use kinescope_core::codecs::{AudioDecoder, CodecParameters, VideoDecoder};
use kinescope_core::errors::{decode_error, Result};
use kinescope_core::formats::{FormatOptions, FormatReader};
use kinescope_core::io::MediaSourceStream;
use kinescope_core::video::VideoFrame;

use super::audio::BinkAudioDecoder;
use super::demuxer::{BinkReader, VIDEO_TRACK_ID};
use super::header::BinkHeader;
use super::video::BinkVideoDecoder;

/// One fully decoded frame: the video image and the decoded audio of every track.
pub struct BinkFrame {
    /// The frame index.
    pub frame_num: u64,
    /// The frame is independently decodable.
    pub keyframe: bool,
    /// The decoded image.
    pub video: VideoFrame,
    /// One decoded packet per audio track, in container order. A track that coded no payload
    /// for this frame yields an empty packet.
    pub audio: Vec<DecodedAudio>,
}

/// A complete Bink decoder: demuxer, video decoder, and one audio decoder per track.
///
/// Frames are produced strictly in encoded order; every frame's video depends on the previous
/// frame and every audio packet on its predecessor's overlap window. Use [`BinkDecoder::reset`]
/// to replay the stream from the start.
pub struct BinkDecoder {
    reader: BinkReader,
    video: Option<BinkVideoDecoder>,
    audio: Vec<BinkAudioDecoder>,
}

impl BinkDecoder {
    /// Attempts to instantiate a decoder from a media source stream.
    ///
    /// An unsupported container parses successfully, exposing its header, but produces no
    /// frames.
    pub fn try_new(source: MediaSourceStream) -> Result<BinkDecoder> {
        let reader = BinkReader::try_new(source, &FormatOptions::default())?;

        let mut video = None;
        let mut audio = Vec::new();

        if reader.header().is_supported() {
            for track in reader.tracks() {
                match &track.codec_params {
                    CodecParameters::Video(params) => {
                        video = Some(BinkVideoDecoder::try_new(params)?);
                    }
                    CodecParameters::Audio(params) => {
                        audio.push(BinkAudioDecoder::try_new(params)?);
                    }
                }
            }
        }

        Ok(BinkDecoder { reader, video, audio })
    }

    /// Gets the parsed container header.
    pub fn header(&self) -> &BinkHeader {
        self.reader.header()
    }

    /// Decodes the next frame, or returns `None` when the stream is exhausted or the container
    /// is unsupported.
    pub fn next_frame(&mut self) -> Result<Option<BinkFrame>> {
        let num_tracks = self.audio.len();

        let mut audio: Vec<DecodedAudio> = self
            .audio
            .iter()
            .map(|dec| {
                let params = dec.codec_params();
                DecodedAudio::new(SignalSpec::new(params.sample_rate, params.channels))
            })
            .collect();

        loop {
            let packet = match self.reader.next_packet()? {
                Some(packet) => packet,
                None => return Ok(None),
            };

            if packet.track_id() == VIDEO_TRACK_ID {
                // The video payload closes the frame.
                let video_dec = match self.video.as_mut() {
                    Some(dec) => dec,
                    None => return decode_error("bink: no video decoder"),
                };

                let video = video_dec.decode(&packet)?;

                return Ok(Some(BinkFrame {
                    frame_num: packet.ts,
                    keyframe: packet.keyframe,
                    video,
                    audio,
                }));
            }

            let track = packet.track_id() as usize - 1;

            if track >= num_tracks {
                return decode_error("bink: packet for unknown track");
            }

            audio[track] = self.audio[track].decode(&packet)?;
        }
    }

    /// Decodes and discards the next frame, advancing all decoder state.
    pub fn skip_frame(&mut self) -> Result<bool> {
        Ok(self.next_frame()?.is_some())
    }

    /// Rewinds the stream and resets all decoder state for a bit-exact replay.
    pub fn reset(&mut self) -> Result<()> {
        self.reader.reset()?;

        if let Some(video) = self.video.as_mut() {
            video.reset();
        }

        for audio in self.audio.iter_mut() {
            audio.reset();
        }

        Ok(())
    }
}
