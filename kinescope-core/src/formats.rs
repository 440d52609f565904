// Kinescope
// Copyright (c) 2026 The Project Kinescope Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `formats` module provides the traits and support structures necessary to implement media
//! demuxers.

use crate::codecs::CodecParameters;
use crate::errors::Result;
use crate::io::{BufReader, MediaSourceStream};

/// `FormatOptions` is a common set of options that all demuxers use.
#[derive(Copy, Clone, Debug)]
pub struct FormatOptions {
    /// Validate index-style tables (e.g. a frame offset table) against the source length during
    /// instantiation. Default: `true`.
    pub validate_index: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions { validate_index: true }
    }
}

/// A `Track` is an independently coded media stream within a container.
#[derive(Clone, Debug)]
pub struct Track {
    /// A unique identifier for the track.
    pub id: u32,
    /// The codec parameters of the track.
    pub codec_params: CodecParameters,
}

impl Track {
    pub fn new(id: u32, codec_params: CodecParameters) -> Self {
        Track { id, codec_params }
    }
}

/// A `Packet` contains a discrete amount of encoded data for a single track.
///
/// The exact amount of data is bounded, but not defined, and is dependant on the container and/or
/// the encapsulated codec.
#[derive(Clone)]
pub struct Packet {
    /// The track id.
    track_id: u32,
    /// The timestamp of the packet. For video tracks this is the frame index; for audio tracks it
    /// is the running sample count, in sample units.
    pub ts: u64,
    /// The duration of the packet in the same units as `ts`. May be 0 if unknown.
    pub dur: u64,
    /// Whether the packet begins an independently decodable frame.
    pub keyframe: bool,
    /// The packet buffer.
    pub data: Box<[u8]>,
}

impl Packet {
    /// Create a new `Packet` from a boxed slice.
    pub fn new_from_boxed_slice(track_id: u32, ts: u64, dur: u64, data: Box<[u8]>) -> Self {
        Packet { track_id, ts, dur, keyframe: false, data }
    }

    /// Create a new `Packet` from a slice.
    pub fn new_from_slice(track_id: u32, ts: u64, dur: u64, buf: &[u8]) -> Self {
        Packet { track_id, ts, dur, keyframe: false, data: Box::from(buf) }
    }

    /// The track identifier of the track this packet belongs to.
    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    /// Get an immutable slice to the packet buffer.
    pub fn buf(&self) -> &[u8] {
        &self.data
    }

    /// Get a `BufReader` to read the packet data buffer sequentially.
    pub fn as_buf_reader(&self) -> BufReader<'_> {
        BufReader::new(&self.data)
    }
}

/// A `FormatReader` is a demultiplexer that splits a container format into its consituent tracks
/// and packets.
pub trait FormatReader: Sized {
    /// Attempt to instantiate a `FormatReader` using the provided `MediaSourceStream`.
    fn try_new(source: MediaSourceStream, options: &FormatOptions) -> Result<Self>;

    /// Gets the next packet from the container in stream order, or `None` when all packets have
    /// been consumed.
    fn next_packet(&mut self) -> Result<Option<Packet>>;

    /// Gets a list of all the tracks in the container.
    fn tracks(&self) -> &[Track];

    /// Resets the reader such that the next call to `next_packet` yields the first packet of the
    /// stream again. Requires a seekable source.
    fn reset(&mut self) -> Result<()>;

    /// Destroys the `FormatReader` and returns the underlying media source stream.
    fn into_inner(self) -> MediaSourceStream;
}
