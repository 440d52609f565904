// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `codecs` module provides the traits and support structures necessary to implement audio
//! and video codec decoders.

use std::fmt;

use crate::audio::{Channels, DecodedAudio};
use crate::errors::Result;
use crate::formats::Packet;
use crate::video::VideoFrame;

/// A `CodecType` is a unique identifier used to identify a specific codec.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct CodecType(u32);

/// Null codec, simply discards all data.
pub const CODEC_TYPE_NULL: CodecType = CodecType(0x0);

// Video codecs
//-------------

/// Bink Video ("Bink 1")
pub const CODEC_TYPE_BINK_VIDEO: CodecType = CodecType(0x100);

// Audio codecs
//-------------

/// Bink Audio (windowed-overlapped DCT variant)
pub const CODEC_TYPE_BINK_AUDIO_DCT: CodecType = CodecType(0x200);
/// Bink Audio (interleaved RDFT variant)
pub const CODEC_TYPE_BINK_AUDIO_RDFT: CodecType = CodecType(0x201);

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            CODEC_TYPE_NULL => "null",
            CODEC_TYPE_BINK_VIDEO => "binkvideo",
            CODEC_TYPE_BINK_AUDIO_DCT => "binkaudio_dct",
            CODEC_TYPE_BINK_AUDIO_RDFT => "binkaudio_rdft",
            _ => return write!(f, "{:#x}", self.0),
        };
        f.write_str(name)
    }
}

impl fmt::Debug for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Codec parameters for an audio track, stated by a demuxer and consumed by a decoder's
/// `try_new`.
#[derive(Clone, Debug)]
pub struct AudioCodecParameters {
    /// The codec type.
    pub codec: CodecType,
    /// The sample rate of the audio in Hz.
    pub sample_rate: u32,
    /// The channel assignment.
    pub channels: Channels,
    /// Extra data (defined by the codec).
    pub extra_data: Option<Box<[u8]>>,
}

impl AudioCodecParameters {
    pub fn new(codec: CodecType, sample_rate: u32, channels: Channels) -> Self {
        AudioCodecParameters { codec, sample_rate, channels, extra_data: None }
    }

    /// Provide codec extra data.
    pub fn with_extra_data(mut self, data: Box<[u8]>) -> Self {
        self.extra_data = Some(data);
        self
    }
}

/// Codec parameters for a video track.
#[derive(Clone, Debug)]
pub struct VideoCodecParameters {
    /// The codec type.
    pub codec: CodecType,
    /// The coded width of a video frame in pixels.
    pub width: u32,
    /// The coded height of a video frame in pixels.
    pub height: u32,
    /// The frame rate as a rational (numerator, denominator).
    pub frame_rate: (u32, u32),
    /// Extra data (defined by the codec).
    pub extra_data: Option<Box<[u8]>>,
}

impl VideoCodecParameters {
    pub fn new(codec: CodecType, width: u32, height: u32) -> Self {
        VideoCodecParameters { codec, width, height, frame_rate: (0, 1), extra_data: None }
    }

    /// Provide the frame rate.
    pub fn with_frame_rate(mut self, num: u32, den: u32) -> Self {
        self.frame_rate = (num, den);
        self
    }

    /// Provide codec extra data.
    pub fn with_extra_data(mut self, data: Box<[u8]>) -> Self {
        self.extra_data = Some(data);
        self
    }
}

/// The codec parameters of a track, either audio or video.
#[derive(Clone, Debug)]
pub enum CodecParameters {
    Audio(AudioCodecParameters),
    Video(VideoCodecParameters),
}

impl CodecParameters {
    /// The codec type of the track.
    pub fn codec(&self) -> CodecType {
        match self {
            CodecParameters::Audio(params) => params.codec,
            CodecParameters::Video(params) => params.codec,
        }
    }

    /// Gets the audio parameters, if this is an audio track.
    pub fn audio(&self) -> Option<&AudioCodecParameters> {
        match self {
            CodecParameters::Audio(params) => Some(params),
            _ => None,
        }
    }

    /// Gets the video parameters, if this is a video track.
    pub fn video(&self) -> Option<&VideoCodecParameters> {
        match self {
            CodecParameters::Video(params) => Some(params),
            _ => None,
        }
    }
}

/// An `AudioDecoder` processes packets of one audio track into PCM.
///
/// A decoder is stateful: packets must be presented in stream order, and `reset` must be called
/// before replaying a stream from the start.
pub trait AudioDecoder: Sized {
    /// Attempt to instantiate the decoder for the given codec parameters.
    fn try_new(params: &AudioCodecParameters) -> Result<Self>;

    /// Decode one packet into PCM.
    fn decode(&mut self, packet: &Packet) -> Result<DecodedAudio>;

    /// Gets the codec parameters the decoder was instantiated with.
    fn codec_params(&self) -> &AudioCodecParameters;

    /// Resets all decoder state for a replay from the start of the stream.
    fn reset(&mut self);
}

/// A `VideoDecoder` processes packets of one video track into frames.
///
/// A decoder is stateful: each frame may reference the previously decoded frame, so packets must
/// be presented in stream order, and `reset` must be called before replaying a stream from the
/// start.
pub trait VideoDecoder: Sized {
    /// Attempt to instantiate the decoder for the given codec parameters.
    fn try_new(params: &VideoCodecParameters) -> Result<Self>;

    /// Decode one packet into a video frame.
    fn decode(&mut self, packet: &Packet) -> Result<VideoFrame>;

    /// Gets the codec parameters the decoder was instantiated with.
    fn codec_params(&self) -> &VideoCodecParameters;

    /// Resets all decoder state for a replay from the start of the stream.
    fn reset(&mut self);
}
